// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local document store.
//!
//! Used for offline development (`NEWSDESK_STORE=memory`) and tests. Data
//! does not survive a restart.

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{Article, ArticleUpdate, Profile};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 15 random bytes encode to the same 20-character length as Firestore auto-IDs.
const DOCUMENT_ID_BYTES: usize = 15;

/// In-memory document store.
#[derive(Clone, Default)]
pub struct MemoryDb {
    articles: Arc<DashMap<String, Article>>,
    profiles: Arc<DashMap<String, Profile>>,
    /// Number of calls made against the store, for asserting side effects
    calls: Arc<AtomicUsize>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of operations issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn generate_id(&self) -> Result<String, AppError> {
        let mut bytes = [0u8; DOCUMENT_ID_BYTES];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| AppError::Database("Failed to generate document ID".to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

#[async_trait]
impl DocumentStore for MemoryDb {
    async fn insert_article(&self, article: &Article) -> Result<String, AppError> {
        self.record_call();
        let id = loop {
            let candidate = self.generate_id()?;
            if !self.articles.contains_key(&candidate) {
                break candidate;
            }
        };

        let mut stored = article.clone();
        stored.id = id.clone();
        self.articles.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get_article(&self, id: &str) -> Result<Option<Article>, AppError> {
        self.record_call();
        Ok(self.articles.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        self.record_call();
        let mut articles: Vec<Article> = self
            .articles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        articles.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(articles)
    }

    async fn update_article(&self, id: &str, update: &ArticleUpdate) -> Result<(), AppError> {
        self.record_call();
        match self.articles.get_mut(id) {
            Some(mut entry) => {
                update.apply_to(entry.value_mut());
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Article {} not found", id))),
        }
    }

    async fn delete_article(&self, id: &str) -> Result<(), AppError> {
        self.record_call();
        self.articles.remove(id);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.record_call();
        Ok(self.profiles.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn set_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError> {
        self.record_call();
        self.profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}
