// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Media upload: local validation plus the Cloudinary upload client.
//!
//! Validation runs before any network traffic. A file the media host
//! rejects is reported as `UploadFailed`; nothing is retried.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{MediaFile, MediaKind};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest video accepted for upload (50 MiB).
pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

const CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Publicly addressable location of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub url: String,
    pub kind: MediaKind,
}

/// Remote media host.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Send an already-validated file and return its secure URL.
    async fn send(&self, file: &MediaFile, kind: MediaKind) -> Result<String, AppError>;
}

/// Check a file's MIME type and size against what `kind` allows.
pub fn validate_upload(content_type: &str, size: u64, kind: MediaKind) -> Result<(), AppError> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with(kind.mime_prefix())
    {
        return Err(AppError::InvalidFileType {
            expected: format!("{}*", kind.mime_prefix()),
            actual: content_type.to_string(),
        });
    }

    if kind == MediaKind::Video && size > MAX_VIDEO_BYTES {
        return Err(AppError::FileTooLarge {
            size,
            limit: MAX_VIDEO_BYTES,
        });
    }

    Ok(())
}

/// Validate `file` and, if it passes, upload it to `host`.
pub async fn upload(
    host: &dyn MediaHost,
    file: &MediaFile,
    kind: MediaKind,
) -> Result<UploadResult, AppError> {
    validate_upload(&file.content_type, file.size(), kind)?;

    tracing::debug!(
        file_name = %file.file_name,
        size = file.size(),
        kind = kind.as_str(),
        "Uploading media"
    );

    let url = host.send(file, kind).await?;

    tracing::info!(kind = kind.as_str(), url = %url, "Media uploaded");
    Ok(UploadResult { url, kind })
}

/// Cloudinary client using an unsigned upload preset.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .context("failed building media HTTP client")?;

        Ok(Self {
            http,
            base_url: CLOUDINARY_API_URL.to_string(),
            cloud_name: config.cloudinary_cloud_name.clone(),
            upload_preset: config.cloudinary_upload_preset.clone(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Upload endpoint for one media kind.
    pub fn endpoint(&self, kind: MediaKind) -> String {
        format!(
            "{}/{}/{}/upload",
            self.base_url,
            urlencoding::encode(&self.cloud_name),
            kind.as_str()
        )
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn send(&self, file: &MediaFile, kind: MediaKind) -> Result<String, AppError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| AppError::UploadFailed(format!("bad content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("cloud_name", self.cloud_name.clone());

        let response = self
            .http
            .post(self.endpoint(kind))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let reason = serde_json::from_str::<CloudinaryError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.clone());
            tracing::warn!(status = %status, reason = %reason, "Media host rejected upload");
            return Err(AppError::UploadFailed(format!("HTTP {}: {}", status, reason)));
        }

        parse_secure_url(&body)
    }
}

#[derive(Deserialize)]
struct CloudinaryUpload {
    #[serde(default)]
    secure_url: Option<String>,
}

#[derive(Deserialize)]
struct CloudinaryError {
    error: CloudinaryErrorBody,
}

#[derive(Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

fn parse_secure_url(body: &str) -> Result<String, AppError> {
    let upload: CloudinaryUpload = serde_json::from_str(body)
        .map_err(|e| AppError::UploadFailed(format!("JSON parse error: {}", e)))?;

    upload
        .secure_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::UploadFailed("response had no secure_url".to_string()))
}
