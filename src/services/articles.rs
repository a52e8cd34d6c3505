// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Article repository: CRUD over the document store plus the
//! ownership and search predicates applied to fetched lists.

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::article::{non_empty, NO_LINK_URL};
use crate::models::{
    Article, ArticleDraft, ArticleSource, ArticleUpdate, ArticleUploads, Identity, MediaFile,
    MediaKind, Profile, ProfileForm,
};
use crate::services::media::{self, MediaHost};
use crate::time_utils::{Clock, MonotonicStamp};
use std::sync::Arc;
use validator::Validate;

/// Article and profile operations against the external store.
pub struct ArticleRepository {
    store: Arc<dyn DocumentStore>,
    media: Arc<dyn MediaHost>,
    clock: Arc<dyn Clock>,
    stamp: MonotonicStamp,
}

impl ArticleRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaHost>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            media,
            clock,
            stamp: MonotonicStamp::new(),
        }
    }

    /// Every article, newest first. Each call re-fetches the full set.
    pub async fn list(&self) -> Result<Vec<Article>, AppError> {
        let articles = self.store.list_articles().await?;
        Ok(articles.into_iter().map(Article::normalized).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Article, AppError> {
        self.store
            .get_article(id)
            .await?
            .map(Article::normalized)
            .ok_or_else(|| AppError::NotFound(format!("Article {}", id)))
    }

    /// Validate `draft`, upload any selected files, then write the article.
    ///
    /// Nothing is uploaded or written when the draft or a file is invalid.
    pub async fn create(
        &self,
        actor: &Identity,
        draft: ArticleDraft,
        uploads: ArticleUploads,
    ) -> Result<Article, AppError> {
        draft.validate()?;
        prevalidate(&uploads)?;

        let image_url = self.upload_opt(uploads.image.as_ref(), MediaKind::Image).await?;
        let video_url = self.upload_opt(uploads.video.as_ref(), MediaKind::Video).await?;

        let author = match non_empty(draft.author) {
            Some(author) => Some(author),
            None => self.default_author(actor).await?,
        };

        let mut article = Article {
            id: String::new(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            content: non_empty(draft.content),
            author,
            url_to_image: image_url.or_else(|| non_empty(draft.url_to_image)),
            video_url,
            url: Some(non_empty(draft.url).unwrap_or_else(|| NO_LINK_URL.to_string())),
            published_at: self.stamp.next(self.clock.as_ref()),
            updated_at: None,
            user_id: Some(actor.uid.clone()),
            user_email: actor.email.clone(),
            source: ArticleSource::user_authored(),
        };

        article.id = self.store.insert_article(&article).await?;

        tracing::info!(
            article_id = %article.id,
            uid = %actor.uid,
            has_image = article.url_to_image.is_some(),
            has_video = article.video_url.is_some(),
            "Article created"
        );
        Ok(article)
    }

    /// Overwrite an article's editable fields.
    ///
    /// Attachments that are not replaced keep their stored URLs. The
    /// creation timestamp, owner and source tag are never touched.
    pub async fn update(
        &self,
        actor: &Identity,
        id: &str,
        draft: ArticleDraft,
        uploads: ArticleUploads,
    ) -> Result<Article, AppError> {
        draft.validate()?;
        prevalidate(&uploads)?;

        let mut article = self.get_by_id(id).await?;
        if !article.is_owned_by(&actor.uid) {
            tracing::warn!(
                article_id = %id,
                uid = %actor.uid,
                owner = article.user_id.as_deref().unwrap_or(""),
                "Updating an article owned by another user"
            );
        }

        let image_url = self.upload_opt(uploads.image.as_ref(), MediaKind::Image).await?;
        let video_url = self.upload_opt(uploads.video.as_ref(), MediaKind::Video).await?;

        let update = ArticleUpdate {
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            content: non_empty(draft.content),
            author: non_empty(draft.author).or_else(|| article.author.clone()),
            url_to_image: image_url
                .or_else(|| non_empty(draft.url_to_image))
                .or_else(|| article.url_to_image.clone()),
            video_url: video_url.or_else(|| article.video_url.clone()),
            url: non_empty(draft.url).or_else(|| article.url.clone()),
            updated_at: self.clock.now(),
        };

        self.store.update_article(id, &update).await?;
        update.apply_to(&mut article);

        tracing::info!(article_id = %id, uid = %actor.uid, "Article updated");
        Ok(article)
    }

    /// Remove an article outright.
    pub async fn delete(&self, actor: &Identity, id: &str) -> Result<(), AppError> {
        if let Some(existing) = self.store.get_article(id).await? {
            if !existing.is_owned_by(&actor.uid) {
                tracing::warn!(
                    article_id = %id,
                    uid = %actor.uid,
                    "Deleting an article owned by another user"
                );
            }
        }

        self.store.delete_article(id).await?;
        tracing::info!(article_id = %id, uid = %actor.uid, "Article deleted");
        Ok(())
    }

    /// The stored profile, if the user ever saved one.
    pub async fn profile(&self, identity: &Identity) -> Result<Option<Profile>, AppError> {
        self.store.get_profile(&identity.uid).await
    }

    /// Replace the user's profile wholesale.
    pub async fn save_profile(
        &self,
        identity: &Identity,
        form: ProfileForm,
    ) -> Result<Profile, AppError> {
        form.validate()?;
        let profile = form.into_profile(identity, self.clock.now());
        self.store.set_profile(&identity.uid, &profile).await?;
        tracing::info!(uid = %identity.uid, "Profile saved");
        Ok(profile)
    }

    async fn upload_opt(
        &self,
        file: Option<&MediaFile>,
        kind: MediaKind,
    ) -> Result<Option<String>, AppError> {
        match file {
            Some(file) => Ok(Some(media::upload(self.media.as_ref(), file, kind).await?.url)),
            None => Ok(None),
        }
    }

    /// Profile name, then identity display name, then email.
    async fn default_author(&self, actor: &Identity) -> Result<Option<String>, AppError> {
        let from_profile = self
            .store
            .get_profile(&actor.uid)
            .await?
            .and_then(|p| p.full_name());

        Ok(from_profile
            .or_else(|| non_empty(actor.display_name.clone()))
            .or_else(|| non_empty(actor.email.clone())))
    }
}

fn prevalidate(uploads: &ArticleUploads) -> Result<(), AppError> {
    if let Some(image) = &uploads.image {
        media::validate_upload(&image.content_type, image.size(), MediaKind::Image)?;
    }
    if let Some(video) = &uploads.video {
        media::validate_upload(&video.content_type, video.size(), MediaKind::Video)?;
    }
    Ok(())
}

/// Articles owned by `uid`, order preserved.
pub fn filter_owned(articles: Vec<Article>, uid: &str) -> Vec<Article> {
    articles.into_iter().filter(|a| a.is_owned_by(uid)).collect()
}

/// Case-insensitive substring search over title, description, author and
/// source name. A blank query matches everything.
pub fn search(articles: Vec<Article>, query: &str) -> Vec<Article> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return articles;
    }
    articles
        .into_iter()
        .filter(|a| a.matches_lowercase(&needle))
        .collect()
}
