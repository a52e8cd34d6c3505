// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure is reported to the caller of the triggering action and
//! nothing is retried automatically.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account does not exist")]
    AccountNotFound,

    #[error("Email address is already in use")]
    EmailAlreadyInUse,

    #[error("Federated sign-in failed: {0}")]
    FederatedFlowFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid file type: expected {expected}, got {actual}")]
    InvalidFileType { expected: String, actual: String },

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Stable machine-readable code used in the `error` field of responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::AccountNotFound => "account_not_found",
            AppError::EmailAlreadyInUse => "email_already_in_use",
            AppError::FederatedFlowFailed(_) => "federated_flow_failed",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_failed",
            AppError::InvalidFileType { .. } => "invalid_file_type",
            AppError::FileTooLarge { .. } => "file_too_large",
            AppError::UploadFailed(_) => "upload_failed",
            AppError::Database(_) => "database_error",
            AppError::Unknown(_) => "unknown",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::InvalidCredentials | AppError::AccountNotFound => {
                (StatusCode::UNAUTHORIZED, None)
            }
            AppError::EmailAlreadyInUse => (StatusCode::CONFLICT, None),
            AppError::FederatedFlowFailed(msg) => (StatusCode::BAD_GATEWAY, Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg.clone())),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::InvalidFileType { .. } => (StatusCode::BAD_REQUEST, Some(self.to_string())),
            AppError::FileTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, Some(self.to_string()))
            }
            AppError::UploadFailed(msg) => (StatusCode::BAD_GATEWAY, Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Unknown(msg) => {
                tracing::error!(error = %msg, "Unclassified provider error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        AppError::Validation(format!("missing or invalid: {}", fields.join(", ")))
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
