// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod article;
pub mod identity;
pub mod product;
pub mod profile;
pub mod session;

pub use article::{
    Article, ArticleDraft, ArticleSource, ArticleUpdate, ArticleUploads, MediaFile, MediaKind,
};
pub use identity::Identity;
pub use product::{Product, ProductForm};
pub use profile::{Profile, ProfileForm};
pub use session::{GateState, Session};
