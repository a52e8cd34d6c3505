// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, sign-up, sign-out and password-reset routes.
//!
//! Each handler returns as soon as the provider call completes; the
//! session snapshot catches up asynchronously.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::models::session::SessionResponse;
use crate::models::Identity;
use crate::services::FederatedCredential;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session))
        .route("/login", get(login_entry))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/federated", post(federated))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/logout", post(logout))
}

/// Email/password pair for sign-in.
#[derive(Deserialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

/// Email/password pair for a new account.
#[derive(Deserialize, Validate)]
pub struct Registration {
    #[validate(email)]
    email: String,
    /// The provider rejects anything shorter
    #[validate(length(min = 6))]
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    email: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginEntryResponse {
    pub sign_in: String,
    pub register: String,
    pub federated: String,
    pub password_reset: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PasswordResetResponse {
    pub status: String,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&state.session.snapshot()))
}

/// Where the gate sends unauthenticated requests.
async fn login_entry() -> Json<LoginEntryResponse> {
    Json(LoginEntryResponse {
        sign_in: "/auth/login".to_string(),
        register: "/auth/register".to_string(),
        federated: "/auth/federated".to_string(),
        password_reset: "/auth/password-reset".to_string(),
    })
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> Result<Json<Identity>> {
    body.validate()?;
    let identity = state
        .identity
        .sign_in_with_password(&body.email, &body.password)
        .await?;
    Ok(Json(identity))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Registration>,
) -> Result<Json<Identity>> {
    body.validate()?;
    let identity = state
        .identity
        .sign_up_with_password(&body.email, &body.password)
        .await?;
    Ok(Json(identity))
}

async fn federated(
    State(state): State<Arc<AppState>>,
    Json(credential): Json<FederatedCredential>,
) -> Result<Json<Identity>> {
    let identity = state.identity.sign_in_with_federated(&credential).await?;
    Ok(Json(identity))
}

/// Always 202 for a well-formed address, whether or not an account exists.
async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<(StatusCode, Json<PasswordResetResponse>)> {
    body.validate()?;
    state.identity.send_password_reset(&body.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PasswordResetResponse {
            status: "sent".to_string(),
        }),
    ))
}

/// Clears the session even if the provider call fails.
async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.identity.sign_out().await;
    StatusCode::NO_CONTENT
}
