// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Newsdesk API Server
//!
//! Publishing desk backend: session gate, article store and media uploads.

use newsdesk::{
    config::{Config, StoreBackend},
    db::{DocumentStore, FirestoreDb, MemoryDb},
    services::{CloudinaryClient, FirebaseAuthProvider},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, store = ?config.store, "Starting Newsdesk API");

    let store: Arc<dyn DocumentStore> = match config.store {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; articles are lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let provider = Arc::new(FirebaseAuthProvider::new(&config)?);
    let media = Arc::new(CloudinaryClient::new(&config)?);
    tracing::info!(
        cloud = %config.cloudinary_cloud_name,
        restore_session = config.refresh_token.is_some(),
        "External services initialized"
    );

    // Build shared state; this also starts the session subscription
    let state = AppState::build(config.clone(), store, provider, media);

    // Build router
    let app = newsdesk::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["newsdesk=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry().with(filter).with(format).init();
}
