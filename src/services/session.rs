// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-wide session context.
//!
//! One background task owns the subscription to the identity gateway's
//! change stream and publishes a fresh [`Session`] snapshot for each
//! change. Consumers read the latest snapshot or subscribe to be woken on
//! every publish. Snapshots are replaced whole, never mutated.

use crate::models::{Identity, Session};
use crate::services::identity::{IdentityChanges, IdentityGateway};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shared handle to the current session.
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionContext {
    /// Context stuck in `initializing`, with no background task.
    ///
    /// Snapshots are published with [`SessionContext::publish`]; mainly for tests.
    pub fn detached() -> Self {
        let (tx, _rx) = watch::channel(Session::initializing());
        Self { tx: Arc::new(tx) }
    }

    /// Start the subscription task.
    ///
    /// The task first resolves the provider's cached identity (ending the
    /// initializing phase) and then applies changes one at a time until the
    /// gateway is dropped.
    pub fn spawn(
        gateway: Arc<IdentityGateway>,
        changes: IdentityChanges,
    ) -> (Self, JoinHandle<()>) {
        let context = Self::detached();
        let publisher = context.clone();

        let handle = tokio::spawn(async move {
            let mut changes = changes;
            let initial = gateway.initial_identity().await;
            tracing::info!(
                signed_in = initial.is_some(),
                "Initial identity check resolved"
            );
            publisher.publish(initial);

            // Holding the gateway would keep the change stream open forever.
            drop(gateway);

            while let Some(identity) = changes.recv().await {
                publisher.publish(identity);
            }
            tracing::debug!("Identity change stream closed");
        });

        (context, handle)
    }

    /// Replace the snapshot with a resolved one and wake all subscribers.
    ///
    /// Equal consecutive snapshots are still published.
    pub fn publish(&self, identity: Option<Identity>) {
        let session = Session::resolved(identity);
        tracing::debug!(
            authenticated = session.is_authenticated(),
            uid = session.identity().map(|i| i.uid.as_str()).unwrap_or(""),
            "Session updated"
        );
        self.tx.send_replace(session);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Receiver that is marked changed on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::GateState;
    use crate::services::identity::{FederatedCredential, IdentityProvider};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn ada() -> Identity {
        Identity {
            uid: "ada".to_string(),
            display_name: Some("Ada".to_string()),
            photo_url: None,
            email: Some("ada@example.com".to_string()),
        }
    }

    /// Provider whose first identity check blocks until released.
    struct GatedProvider {
        release: Notify,
        cached: Option<Identity>,
    }

    #[async_trait]
    impl IdentityProvider for GatedProvider {
        async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<Identity, AppError> {
            Ok(ada())
        }
        async fn sign_in_with_federated(
            &self,
            _: &FederatedCredential,
        ) -> Result<Identity, AppError> {
            Ok(ada())
        }
        async fn sign_up_with_password(&self, _: &str, _: &str) -> Result<Identity, AppError> {
            Ok(ada())
        }
        async fn send_password_reset(&self, _: &str) -> Result<(), AppError> {
            Ok(())
        }
        async fn sign_out(&self) -> Result<(), AppError> {
            Ok(())
        }
        async fn current_identity(&self) -> Result<Option<Identity>, AppError> {
            self.release.notified().await;
            Ok(self.cached.clone())
        }
    }

    fn start(
        cached: Option<Identity>,
    ) -> (SessionContext, Arc<IdentityGateway>, Arc<GatedProvider>) {
        let provider = Arc::new(GatedProvider {
            release: Notify::new(),
            cached,
        });
        let (gateway, changes) = IdentityGateway::new(provider.clone());
        let gateway = Arc::new(gateway);
        let (context, _handle) = SessionContext::spawn(gateway.clone(), changes);
        (context, gateway, provider)
    }

    #[tokio::test]
    async fn test_initializing_until_first_check_resolves() {
        let (context, _gateway, provider) = start(None);
        let mut rx = context.subscribe();

        assert!(context.snapshot().is_initializing());
        assert_eq!(context.snapshot().gate_state(), GateState::Initializing);

        provider.release.notify_one();
        rx.changed().await.unwrap();

        let session = rx.borrow_and_update().clone();
        assert!(!session.is_initializing());
        assert!(!session.is_authenticated());
        assert_eq!(session.gate_state(), GateState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_cached_identity_resolves_authenticated() {
        let (context, _gateway, provider) = start(Some(ada()));
        let mut rx = context.subscribe();

        provider.release.notify_one();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().identity(), Some(&ada()));
    }

    #[tokio::test]
    async fn test_changes_are_published_and_never_reinitialize() {
        let (context, gateway, provider) = start(None);
        let mut rx = context.subscribe();
        provider.release.notify_one();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        gateway
            .sign_in_with_password("ada@example.com", "pw")
            .await
            .unwrap();
        rx.changed().await.unwrap();
        {
            let session = rx.borrow_and_update();
            assert!(session.is_authenticated());
            assert!(!session.is_initializing());
            assert_eq!(session.is_authenticated(), session.identity().is_some());
        }

        gateway.sign_out().await;
        rx.changed().await.unwrap();
        let session = rx.borrow_and_update().clone();
        assert!(!session.is_authenticated());
        assert!(!session.is_initializing());
    }

    #[tokio::test]
    async fn test_equal_snapshots_still_notify() {
        let context = SessionContext::detached();
        let mut rx = context.subscribe();

        context.publish(None);
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        context.publish(None);
        assert!(rx.has_changed().unwrap());
    }
}
