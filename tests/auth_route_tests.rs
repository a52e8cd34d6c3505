// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity route tests: error kinds and session side effects.

use axum::http::StatusCode;
use serde_json::json;
use std::sync::atomic::Ordering;

mod common;
use common::{body_json, get, json_request, PASSWORD};

#[tokio::test]
async fn test_login_returns_identity() {
    let app = common::signed_out_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "alice@example.com", "password": PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["uid"], "alice-uid");
    assert_eq!(body["display_name"], "Alice Reporter");
}

#[tokio::test]
async fn test_login_error_kinds() {
    let app = common::signed_out_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_credentials");

    let response = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "account_not_found");

    // Still signed out
    let body = body_json(app.send(get("/session")).await).await;
    assert_eq!(body["is_authenticated"], false);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let app = common::signed_out_app().await;
    let response = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "not-an-email", "password": PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_failed");
    assert!(body["details"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_register_new_and_existing() {
    let app = common::signed_out_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/register",
            json!({ "email": "carol@example.com", "password": "secret1" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    app.until_signed_in(true).await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/register",
            json!({ "email": "alice@example.com", "password": "secret1" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "email_already_in_use");
}

#[tokio::test]
async fn test_federated_sign_in() {
    let app = common::signed_out_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/federated",
            json!({ "provider_id": "google.com", "id_token": "good-google-token" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["uid"], "bob-uid");

    let response = app
        .send(json_request("POST", "/auth/federated", json!({ "id_token": "forged" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "federated_flow_failed");

    // Cancelled consent: no credential at all
    let response = app
        .send(json_request("POST", "/auth/federated", json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_password_reset_same_answer_for_unknown_accounts() {
    let app = common::signed_out_app().await;

    for email in ["alice@example.com", "ghost@example.com"] {
        let response = app
            .send(json_request(
                "POST",
                "/auth/password-reset",
                json!({ "email": email }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED, "{}", email);
        assert_eq!(body_json(response).await, json!({ "status": "sent" }));
    }
}

#[tokio::test]
async fn test_logout_clears_session_even_when_provider_fails() {
    let app = common::signed_in_app().await;

    let response = app.send(json_request("POST", "/auth/logout", json!({}))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.provider.sign_outs.load(Ordering::SeqCst), 1);

    app.until_signed_in(false).await;
    let body = body_json(app.send(get("/session")).await).await;
    assert_eq!(body["is_authenticated"], false);
    assert_eq!(body["identity"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_login_entry_point() {
    let app = common::signed_out_app().await;
    let response = app.send(get("/login")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["sign_in"], "/auth/login");
}
