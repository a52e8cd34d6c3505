// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Newsdesk: publishing desk backend for a news front-end.
//!
//! This crate holds the session gate in front of the authoring routes,
//! the article repository over the document store, and the media upload
//! path to the image/video host.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{
    ArticleRepository, IdentityGateway, IdentityProvider, MediaHost, ProductCatalog,
    SessionContext,
};
use std::sync::Arc;
use time_utils::{Clock, SystemClock};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: Arc<IdentityGateway>,
    pub session: SessionContext,
    pub articles: ArticleRepository,
    pub products: ProductCatalog,
}

impl AppState {
    /// Wire the services together and start the session subscription.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn build(
        config: Config,
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
        media: Arc<dyn MediaHost>,
    ) -> Arc<Self> {
        Self::build_with_clock(config, store, provider, media, Arc::new(SystemClock))
    }

    pub fn build_with_clock(
        config: Config,
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
        media: Arc<dyn MediaHost>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (gateway, changes) = IdentityGateway::new(provider);
        let identity = Arc::new(gateway);
        let (session, _task) = SessionContext::spawn(identity.clone(), changes);

        Arc::new(Self {
            config,
            identity,
            session,
            articles: ArticleRepository::new(store, media, clock),
            products: ProductCatalog::seeded(),
        })
    }
}
