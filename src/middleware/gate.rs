// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access gate for protected routes.
//!
//! Evaluated on every request against the latest session snapshot:
//! - `Initializing`: 503 with a bare loading body, nothing else.
//! - `Unauthenticated`: 303 to the sign-in entry point. The requested
//!   path is not remembered.
//! - `Authenticated`: the handler runs with [`CurrentUser`] available.

use crate::models::{GateState, Identity};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Sign-in entry point.
pub const LOGIN_PATH: &str = "/login";

/// Identity of the signed-in user, inserted for protected handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

/// Middleware enforcing the access gate.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = state.session.snapshot();

    match session.gate_state() {
        GateState::Initializing => loading_response(),
        GateState::Unauthenticated => {
            tracing::debug!(path = %request.uri().path(), "Redirecting to sign-in");
            Redirect::to(LOGIN_PATH).into_response()
        }
        GateState::Authenticated => match session.identity() {
            Some(identity) => {
                request
                    .extensions_mut()
                    .insert(CurrentUser(identity.clone()));
                next.run(request).await
            }
            None => Redirect::to(LOGIN_PATH).into_response(),
        },
    }
}

fn loading_response() -> Response {
    let mut response = (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "loading" })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
    response
}
