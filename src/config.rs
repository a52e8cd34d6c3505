//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file in the working directory
//! is honoured for local development.

use std::env;

/// Which document store backs the article and profile collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or its emulator).
    Firestore,
    /// Process-local maps, lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("NEWSDESK_STORE", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Identity provider ---
    /// Web API key for the identity provider REST endpoints
    pub identity_api_key: String,
    /// Refresh token cached from a previous sign-in, used for the first identity check
    pub refresh_token: Option<String>,

    // --- Document store ---
    /// GCP project ID
    pub gcp_project_id: String,
    /// Store backend selection
    pub store: StoreBackend,

    // --- Media host ---
    /// Cloudinary cloud (account) name
    pub cloudinary_cloud_name: String,
    /// Unsigned upload preset
    pub cloudinary_upload_preset: String,

    // --- Server ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            identity_api_key: "test_api_key".to_string(),
            refresh_token: None,
            gcp_project_id: "test-project".to_string(),
            store: StoreBackend::Memory,
            cloudinary_cloud_name: "test-cloud".to_string(),
            cloudinary_upload_preset: "news_upload".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store = match env::var("NEWSDESK_STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        Ok(Self {
            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
            refresh_token: env::var("NEWSDESK_REFRESH_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store,
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CLOUDINARY_CLOUD_NAME"))?,
            cloudinary_upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET")
                .unwrap_or_else(|_| "news_upload".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
