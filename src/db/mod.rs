//! Database layer (external document store).

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Article, ArticleUpdate, Profile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Articles, both user-authored and syndicated
    pub const ARTICLES: &str = "news";
    /// Profiles (keyed by user ID)
    pub const PROFILES: &str = "profile";
}

/// Operations the application needs from the document store.
///
/// Each document is addressed by an opaque string ID. There is no
/// concurrency token: concurrent writes to the same document are
/// last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new article under a store-generated ID and return that ID.
    /// `article.id` is ignored.
    async fn insert_article(&self, article: &Article) -> Result<String, AppError>;

    /// Get an article by ID.
    async fn get_article(&self, id: &str) -> Result<Option<Article>, AppError>;

    /// All articles, newest `published_at` first.
    async fn list_articles(&self) -> Result<Vec<Article>, AppError>;

    /// Overwrite the fields listed in [`ArticleUpdate::FIELDS`] of an
    /// existing article. Never creates a document: a missing ID fails
    /// with [`AppError::NotFound`].
    async fn update_article(&self, id: &str, update: &ArticleUpdate) -> Result<(), AppError>;

    /// Remove an article outright. Deleting a missing ID is not an error.
    async fn delete_article(&self, id: &str) -> Result<(), AppError>;

    /// Get a user's profile.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError>;

    /// Replace a user's profile wholesale.
    async fn set_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError>;
}
