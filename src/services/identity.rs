// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity gateway: sign-in, sign-up, sign-out and password reset.
//!
//! The gateway wraps an [`IdentityProvider`], narrows provider failures to
//! the error kinds each operation is allowed to report, and publishes every
//! identity change on a channel consumed by the session context. Changes
//! are delivered asynchronously: a caller can observe the operation's
//! return value before the session snapshot reflects it.

use crate::error::AppError;
use crate::models::Identity;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Credential obtained by the browser from an interactive consent flow.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedCredential {
    /// Provider identifier, e.g. `google.com`
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_provider_id() -> String {
    "google.com".to_string()
}

/// The external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Identity, AppError>;

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AppError>;

    async fn sign_up_with_password(&self, email: &str, password: &str)
        -> Result<Identity, AppError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError>;

    /// Drop the provider-side session.
    async fn sign_out(&self) -> Result<(), AppError>;

    /// First identity check: whoever the provider still has cached, if anyone.
    async fn current_identity(&self) -> Result<Option<Identity>, AppError>;
}

/// Receiving end of the gateway's change notifications.
pub struct IdentityChanges {
    rx: mpsc::UnboundedReceiver<Option<Identity>>,
}

impl IdentityChanges {
    /// Next change, or `None` once the gateway is gone.
    pub async fn recv(&mut self) -> Option<Option<Identity>> {
        self.rx.recv().await
    }
}

/// Functional wrapper over the identity provider.
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
    changes: mpsc::UnboundedSender<Option<Identity>>,
}

impl IdentityGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> (Self, IdentityChanges) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                provider,
                changes: tx,
            },
            IdentityChanges { rx },
        )
    }

    /// Sign in with email and password.
    ///
    /// Fails with `InvalidCredentials`, `AccountNotFound`, or `Unknown`.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let identity = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| match e {
                AppError::InvalidCredentials | AppError::AccountNotFound => e,
                other => unclassified(other),
            })?;

        tracing::info!(uid = %identity.uid, user = identity.label(), "Signed in with password");
        self.notify(Some(identity.clone()));
        Ok(identity)
    }

    /// Complete a federated sign-in. Every failure is `FederatedFlowFailed`.
    pub async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AppError> {
        if credential.id_token.is_none() && credential.access_token.is_none() {
            return Err(AppError::FederatedFlowFailed(
                "consent flow returned no credential".to_string(),
            ));
        }

        let identity = self
            .provider
            .sign_in_with_federated(credential)
            .await
            .map_err(|e| match e {
                AppError::FederatedFlowFailed(_) => e,
                other => AppError::FederatedFlowFailed(other.to_string()),
            })?;

        tracing::info!(
            uid = %identity.uid,
            provider = %credential.provider_id,
            "Signed in with federated provider"
        );
        self.notify(Some(identity.clone()));
        Ok(identity)
    }

    /// Create an account. Fails with `EmailAlreadyInUse` or `Unknown`.
    pub async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let identity = self
            .provider
            .sign_up_with_password(email, password)
            .await
            .map_err(|e| match e {
                AppError::EmailAlreadyInUse => e,
                other => unclassified(other),
            })?;

        tracing::info!(uid = %identity.uid, "Account created");
        self.notify(Some(identity.clone()));
        Ok(identity)
    }

    /// Request a password-reset email.
    ///
    /// An unknown address is reported as success so the response never
    /// reveals whether an account exists. Anything else fails as `Unknown`.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        match self.provider.send_password_reset(email).await {
            Ok(()) | Err(AppError::AccountNotFound) => Ok(()),
            Err(e) => Err(unclassified(e)),
        }
    }

    /// Sign out. The local session is always cleared, even when the
    /// provider call fails.
    pub async fn sign_out(&self) {
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "Provider sign-out failed; clearing local session anyway");
        }
        tracing::info!("Signed out");
        self.notify(None);
    }

    /// Resolve the identity the provider has cached, treating a failed
    /// check as signed out.
    pub async fn initial_identity(&self) -> Option<Identity> {
        match self.provider.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Initial identity check failed; treating as signed out");
                None
            }
        }
    }

    fn notify(&self, identity: Option<Identity>) {
        if self.changes.send(identity).is_err() {
            tracing::debug!("No session listener for identity change");
        }
    }
}

fn unclassified(err: AppError) -> AppError {
    match err {
        AppError::Unknown(_) => err,
        other => AppError::Unknown(other.to_string()),
    }
}
