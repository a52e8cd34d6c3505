// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access gate tests.
//!
//! These tests verify that:
//! 1. Nothing protected is served while the first identity check is pending
//! 2. Signed-out requests are redirected to the sign-in entry point
//! 3. The gate follows later sign-ins and sign-outs

use axum::http::{header, StatusCode};
use serde_json::json;

mod common;
use common::{body_json, get, json_request, PASSWORD};

#[tokio::test]
async fn test_initializing_renders_only_loading() {
    let app = common::initializing_app();

    let response = app.send(get("/api/my/articles")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    assert_eq!(body_json(response).await, json!({ "status": "loading" }));

    let response = app.send(get("/api/profile")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_public_routes_served_while_initializing() {
    let app = common::initializing_app();

    let response = app.send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get("/session")).await;
    let body = body_json(response).await;
    assert_eq!(body["is_initializing"], true);
    assert_eq!(body["is_authenticated"], false);
}

#[tokio::test]
async fn test_initializing_resolves_to_redirect() {
    let app = common::initializing_app();
    app.hold.notify_one();
    app.resolved().await;

    let response = app.send(get("/api/my/articles?q=markets")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    // No memory of the requested page
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_unauthenticated_is_redirected_for_every_protected_route() {
    let app = common::signed_out_app().await;

    for (method, uri) in [
        ("GET", "/api/my/articles"),
        ("POST", "/api/articles"),
        ("PUT", "/api/articles/abc"),
        ("DELETE", "/api/articles/abc"),
        ("GET", "/api/profile"),
        ("GET", "/api/admin/products"),
        ("DELETE", "/api/admin/products/1"),
    ] {
        let response = app.send(json_request(method, uri, json!({}))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{} {}", method, uri);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }
}

#[tokio::test]
async fn test_cached_identity_opens_gate() {
    let app = common::signed_in_app().await;

    let response = app.send(get("/api/my/articles")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.send(get("/session")).await).await;
    assert_eq!(body["is_authenticated"], true);
    assert_eq!(body["identity"]["uid"], "alice-uid");
}

#[tokio::test]
async fn test_gate_follows_sign_in_and_sign_out() {
    let app = common::signed_out_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "alice@example.com", "password": PASSWORD }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    app.until_signed_in(true).await;

    let response = app.send(get("/api/profile")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(json_request("POST", "/auth/logout", json!({}))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    app.until_signed_in(false).await;

    let response = app.send(get("/api/profile")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_security_headers_on_gate_responses() {
    let app = common::signed_out_app().await;
    let response = app.send(get("/api/profile")).await;
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}
