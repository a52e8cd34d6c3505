// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Article and profile API routes.

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::profile::ProfileResponse;
use crate::models::{
    Article, ArticleDraft, ArticleUploads, MediaFile, MediaKind, Profile, ProfileForm,
};
use crate::services::articles::{filter_owned, search};
use crate::services::media::MAX_VIDEO_BYTES;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::multipart::{Field, MultipartError},
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Room for a maximum-size video plus an image and the text fields.
/// Videos are cut off at their own cap while streaming, well before this.
const ARTICLE_FORM_BODY_LIMIT: usize = (MAX_VIDEO_BYTES as usize) + 30 * 1024 * 1024;

/// Routes readable without signing in.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/articles", get(list_articles))
        .route("/api/articles/{id}", get(get_article))
}

/// Routes behind the access gate (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/my/articles", get(list_my_articles))
        .route(
            "/api/articles",
            axum::routing::post(create_article)
                .layer(DefaultBodyLimit::max(ARTICLE_FORM_BODY_LIMIT)),
        )
        .route(
            "/api/articles/{id}",
            axum::routing::put(update_article)
                .layer(DefaultBodyLimit::max(ARTICLE_FORM_BODY_LIMIT))
                .delete(delete_article),
        )
        .route("/api/profile", get(get_profile).put(put_profile))
}

// ─── Articles ────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArticleSourceResponse {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Article as returned to the front-end.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub author: Option<String>,
    pub url_to_image: Option<String>,
    pub video_url: Option<String>,
    pub url: Option<String>,
    pub published_at: String,
    pub updated_at: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub source: ArticleSourceResponse,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            description: article.description,
            content: article.content,
            author: article.author,
            url_to_image: article.url_to_image,
            video_url: article.video_url,
            url: article.url,
            published_at: format_utc_rfc3339(article.published_at),
            updated_at: article.updated_at.map(format_utc_rfc3339),
            user_id: article.user_id,
            user_email: article.user_email,
            source: ArticleSourceResponse {
                id: article.source.id,
                name: article.source.name,
            },
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArticlesResponse {
    pub articles: Vec<ArticleResponse>,
    pub total: usize,
}

impl From<Vec<Article>> for ArticlesResponse {
    fn from(articles: Vec<Article>) -> Self {
        let articles: Vec<ArticleResponse> = articles.into_iter().map(Into::into).collect();
        Self {
            total: articles.len(),
            articles,
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    /// Case-insensitive substring filter
    #[serde(default)]
    q: Option<String>,
}

async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ArticlesResponse>> {
    let articles = state.articles.list().await?;
    let articles = search(articles, params.q.as_deref().unwrap_or(""));
    Ok(Json(articles.into()))
}

/// The signed-in user's articles, filtered after a full fetch.
async fn list_my_articles(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ArticlesResponse>> {
    let articles = filter_owned(state.articles.list().await?, &user.uid);
    let articles = search(articles, params.q.as_deref().unwrap_or(""));
    Ok(Json(articles.into()))
}

async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ArticleResponse>> {
    Ok(Json(state.articles.get_by_id(&id).await?.into()))
}

async fn create_article(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ArticleResponse>)> {
    let (draft, uploads) = read_article_form(multipart).await?;
    let article = state.articles.create(&user, draft, uploads).await?;
    Ok((StatusCode::CREATED, Json(article.into())))
}

async fn update_article(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ArticleResponse>> {
    let (draft, uploads) = read_article_form(multipart).await?;
    let article = state.articles.update(&user, &id, draft, uploads).await?;
    Ok(Json(article.into()))
}

async fn delete_article(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.articles.delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Collect the article form. Empty file inputs count as "no file".
async fn read_article_form(mut multipart: Multipart) -> Result<(ArticleDraft, ArticleUploads)> {
    let mut draft = ArticleDraft::default();
    let mut uploads = ArticleUploads::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" || name == "video" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = if name == "video" && is_video(&content_type) {
                read_capped(field, MAX_VIDEO_BYTES).await?
            } else {
                field.bytes().await.map_err(malformed)?
            };
            if bytes.is_empty() {
                continue;
            }

            let file = MediaFile {
                file_name,
                content_type,
                bytes,
            };
            if name == "image" {
                uploads.image = Some(file);
            } else {
                uploads.video = Some(file);
            }
            continue;
        }

        let text = field.text().await.map_err(malformed)?;
        match name.as_str() {
            "title" => draft.title = text,
            "description" => draft.description = text,
            "content" => draft.content = Some(text),
            "author" => draft.author = Some(text),
            "url" => draft.url = Some(text),
            "url_to_image" | "urlToImage" => draft.url_to_image = Some(text),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok((draft, uploads))
}

fn is_video(content_type: &str) -> bool {
    content_type
        .to_ascii_lowercase()
        .starts_with(MediaKind::Video.mime_prefix())
}

/// Read a file part, giving up as soon as it grows past `limit`.
///
/// Hitting the request body limit mid-file counts as the same failure.
async fn read_capped(mut field: Field<'_>, limit: u64) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(AppError::FileTooLarge {
                    size: buf.len() as u64,
                    limit,
                });
            }
            Err(err) => return Err(malformed(err)),
        };
        buf.extend_from_slice(&chunk);
        if buf.len() as u64 > limit {
            return Err(AppError::FileTooLarge {
                size: buf.len() as u64,
                limit,
            });
        }
    }
    Ok(buf.freeze())
}

fn malformed(err: MultipartError) -> AppError {
    AppError::Validation(format!("malformed form: {}", err.body_text()))
}

// ─── Profile ─────────────────────────────────────────────────

/// Stored profile, or identity-derived defaults if none was saved.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>> {
    let response = match state.articles.profile(&user).await? {
        Some(profile) => ProfileResponse::new(profile.with_email_fallback(&user), true),
        None => ProfileResponse::new(Profile::defaults_for(&user), false),
    };
    Ok(Json(response))
}

async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.articles.save_profile(&user, form).await?;
    Ok(Json(ProfileResponse::new(
        profile.with_email_fallback(&user),
        true,
    )))
}
