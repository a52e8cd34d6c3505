// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use newsdesk::config::Config;
use newsdesk::db::{FirestoreDb, MemoryDb};
use newsdesk::error::AppError;
use newsdesk::models::{Identity, MediaFile, MediaKind};
use newsdesk::routes::create_router;
use newsdesk::services::{FederatedCredential, IdentityProvider, MediaHost};
use newsdesk::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Check if emulator is available via environment variable.
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

pub const PASSWORD: &str = "correct-horse";

pub fn alice() -> Identity {
    Identity {
        uid: "alice-uid".to_string(),
        display_name: Some("Alice Reporter".to_string()),
        photo_url: None,
        email: Some("alice@example.com".to_string()),
    }
}

pub fn bob() -> Identity {
    Identity {
        uid: "bob-uid".to_string(),
        display_name: None,
        photo_url: None,
        email: Some("bob@example.com".to_string()),
    }
}

/// Identity provider with two known accounts and a controllable first check.
pub struct FakeProvider {
    cached: Option<Identity>,
    /// When set, the first identity check waits for a notification
    hold: Option<Arc<Notify>>,
    accounts: Mutex<Vec<Identity>>,
    pub sign_outs: AtomicUsize,
}

impl FakeProvider {
    pub fn new(cached: Option<Identity>, hold: Option<Arc<Notify>>) -> Self {
        Self {
            cached,
            hold,
            accounts: Mutex::new(vec![alice(), bob()]),
            sign_outs: AtomicUsize::new(0),
        }
    }

    fn find(&self, email: &str) -> Option<Identity> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.email.as_deref() == Some(email))
            .cloned()
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        match self.find(email) {
            Some(identity) if password == PASSWORD => Ok(identity),
            Some(_) => Err(AppError::InvalidCredentials),
            None => Err(AppError::AccountNotFound),
        }
    }

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, AppError> {
        match credential.id_token.as_deref() {
            Some("good-google-token") => Ok(bob()),
            _ => Err(AppError::Unknown("INVALID_IDP_RESPONSE".to_string())),
        }
    }

    async fn sign_up_with_password(&self, email: &str, _password: &str) -> Result<Identity, AppError> {
        if self.find(email).is_some() {
            return Err(AppError::EmailAlreadyInUse);
        }
        let identity = Identity {
            uid: format!("uid-{}", email),
            display_name: None,
            photo_url: None,
            email: Some(email.to_string()),
        };
        self.accounts.lock().unwrap().push(identity.clone());
        Ok(identity)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        match self.find(email) {
            Some(_) => Ok(()),
            None => Err(AppError::AccountNotFound),
        }
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Unknown("network unreachable".to_string()))
    }

    async fn current_identity(&self) -> Result<Option<Identity>, AppError> {
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        Ok(self.cached.clone())
    }
}

/// Media host that records what it was sent.
#[derive(Default)]
pub struct RecordingMediaHost {
    pub sent: Mutex<Vec<(String, MediaKind)>>,
}

impl RecordingMediaHost {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaHost for RecordingMediaHost {
    async fn send(&self, file: &MediaFile, kind: MediaKind) -> Result<String, AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((file.file_name.clone(), kind));
        Ok(format!(
            "https://res.cloudinary.test/{}/upload/{}",
            kind.as_str(),
            file.file_name
        ))
    }
}

/// Offline app plus handles to its fakes.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryDb,
    pub media: Arc<RecordingMediaHost>,
    pub provider: Arc<FakeProvider>,
    pub hold: Arc<Notify>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Wait until the session has left `initializing`.
    pub async fn resolved(&self) {
        let mut rx = self.state.session.subscribe();
        rx.wait_for(|s| !s.is_initializing()).await.unwrap();
    }

    /// Wait until the session's authentication matches `signed_in`.
    pub async fn until_signed_in(&self, signed_in: bool) {
        let mut rx = self.state.session.subscribe();
        rx.wait_for(|s| !s.is_initializing() && s.is_authenticated() == signed_in)
            .await
            .unwrap();
    }
}

fn build(cached: Option<Identity>, hold: bool) -> TestApp {
    let hold_signal = Arc::new(Notify::new());
    let provider = Arc::new(FakeProvider::new(
        cached,
        hold.then(|| hold_signal.clone()),
    ));
    let db = MemoryDb::new();
    let media = Arc::new(RecordingMediaHost::default());

    let state = AppState::build(
        Config::test_default(),
        Arc::new(db.clone()),
        provider.clone(),
        media.clone(),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        media,
        provider,
        hold: hold_signal,
    }
}

/// App whose first identity check has not resolved yet.
pub fn initializing_app() -> TestApp {
    build(None, true)
}

/// App resolved to signed out.
pub async fn signed_out_app() -> TestApp {
    let app = build(None, false);
    app.resolved().await;
    app
}

/// App resolved to Alice, restored from the provider cache.
pub async fn signed_in_app() -> TestApp {
    let app = build(Some(alice()), false);
    app.until_signed_in(true).await;
    app
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A file part for [`multipart_request`].
pub struct FilePart {
    pub field: &'static str,
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

const BOUNDARY: &str = "newsdesk-test-boundary";

pub fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    files: Vec<FilePart>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
