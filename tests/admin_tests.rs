// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin product catalog route tests.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{body_json, get, json_request};

#[tokio::test]
async fn test_product_crud() {
    let app = common::signed_in_app().await;

    let body = body_json(app.send(get("/api/admin/products")).await).await;
    assert_eq!(
        body,
        json!([
            { "id": 1, "name": "Product A", "price": 100.0 },
            { "id": 2, "name": "Product B", "price": 200.0 },
        ])
    );

    let response = app
        .send(json_request(
            "POST",
            "/api/admin/products",
            json!({ "name": "Product C", "price": 42.5 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let added = body_json(response).await;
    let id = added["id"].as_u64().unwrap();
    assert!(id > 2);

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/admin/products/{}", id),
            json!({ "name": "Product C+", "price": 50.0 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Product C+");

    let response = app
        .send(json_request("DELETE", "/api/admin/products/1", json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = body_json(app.send(get("/api/admin/products")).await).await;
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Product B", "Product C+"]);
}

#[tokio::test]
async fn test_product_validation_and_missing() {
    let app = common::signed_in_app().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/admin/products",
            json!({ "name": "", "price": 1.0 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(json_request(
            "PUT",
            "/api/admin/products/999",
            json!({ "name": "Ghost", "price": 1.0 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_product_id_is_a_json_validation_error() {
    let app = common::signed_in_app().await;

    let response = app
        .send(json_request(
            "PUT",
            "/api/admin/products/abc",
            json!({ "name": "X", "price": 1.0 }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_failed");
    assert!(body["details"].as_str().unwrap().contains("abc"));

    let response = app
        .send(json_request("DELETE", "/api/admin/products/abc", json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_failed");

    let body = body_json(app.send(get("/api/admin/products")).await).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
