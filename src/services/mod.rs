// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod articles;
pub mod firebase_auth;
pub mod identity;
pub mod media;
pub mod products;
pub mod session;

pub use articles::ArticleRepository;
pub use firebase_auth::FirebaseAuthProvider;
pub use identity::{FederatedCredential, IdentityChanges, IdentityGateway, IdentityProvider};
pub use media::{CloudinaryClient, MediaHost, UploadResult};
pub use products::ProductCatalog;
pub use session::SessionContext;
