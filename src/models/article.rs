// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! News article model for storage and API.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Source tag id for articles written through this service.
pub const USER_NEWS_SOURCE_ID: &str = "user-news";
/// Display name paired with [`USER_NEWS_SOURCE_ID`].
pub const USER_NEWS_SOURCE_NAME: &str = "User Created";
/// Stored when a draft carries no external link.
pub const NO_LINK_URL: &str = "#";

/// Where an article came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ArticleSource {
    /// Tag for user-authored articles.
    pub fn user_authored() -> Self {
        Self {
            id: Some(USER_NEWS_SOURCE_ID.to_string()),
            name: Some(USER_NEWS_SOURCE_NAME.to_string()),
        }
    }

    pub fn is_user_authored(&self) -> bool {
        self.id.as_deref() == Some(USER_NEWS_SOURCE_ID)
    }
}

/// Article document in the `news` collection.
///
/// Field names are camelCase on the wire so that documents written by the
/// browser client and by syndication jobs read back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Document ID (assigned by the store, never written as a field)
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Syndicated documents may carry a null or missing title/description
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Long-form body
    #[serde(default)]
    pub content: Option<String>,
    /// Author display string
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// External source link
    #[serde(default)]
    pub url: Option<String>,
    /// Set once at creation; the only sort key for listing
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub published_at: DateTime<Utc>,
    /// Set on every update
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning user (absent for syndicated items)
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
}

impl Article {
    /// Coerce a freshly-read record: trim text and drop empty optionals.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        for field in [
            &mut self.content,
            &mut self.author,
            &mut self.url_to_image,
            &mut self.video_url,
            &mut self.url,
            &mut self.user_id,
            &mut self.user_email,
        ] {
            *field = non_empty(field.take());
        }
        self
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.user_id.as_deref() == Some(uid)
    }

    /// Case-insensitive substring match across title, description, author
    /// and source name. `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            self.author.as_deref(),
            self.source.name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Field-level update written over an existing article.
///
/// `published_at`, `user_id`, `user_email` and `source` are deliberately
/// absent: an update can never touch them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub author: Option<String>,
    pub url_to_image: Option<String>,
    pub video_url: Option<String>,
    pub url: Option<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ArticleUpdate {
    /// Document field paths covered by this update.
    pub const FIELDS: [&'static str; 8] = [
        "title",
        "description",
        "content",
        "author",
        "urlToImage",
        "videoUrl",
        "url",
        "updatedAt",
    ];

    pub fn apply_to(&self, article: &mut Article) {
        article.title = self.title.clone();
        article.description = self.description.clone();
        article.content = self.content.clone();
        article.author = self.author.clone();
        article.url_to_image = self.url_to_image.clone();
        article.video_url = self.video_url.clone();
        article.url = self.url.clone();
        article.updated_at = Some(self.updated_at);
    }
}

/// In-progress article payload collected from the create/edit form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ArticleDraft {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Image URL typed by hand; replaced when an image file is uploaded
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Kind of media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Required MIME type prefix, e.g. `image/`.
    pub fn mime_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Video => "video/",
        }
    }

    /// Path segment used by the media host.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// A file selected for upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Files selected alongside a draft.
#[derive(Debug, Clone, Default)]
pub struct ArticleUploads {
    pub image: Option<MediaFile>,
    pub video: Option<MediaFile>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
