// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin dashboard product routes.

use crate::error::{AppError, Result};
use crate::models::{Product, ProductForm};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

/// Product catalog routes (behind the access gate).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/products", get(list_products).post(add_product))
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
}

async fn list_products(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.products.list())
}

async fn add_product(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.products.add(form)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<ProductForm>,
) -> Result<Json<Product>> {
    Ok(Json(state.products.update(parse_id(&id)?, form)?))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.products.delete(parse_id(&id)?);
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid product id: {}", raw)))
}
