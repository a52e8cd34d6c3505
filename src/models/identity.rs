//! Authenticated principal as reported by the identity provider.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Identity {
    /// Provider-assigned unique user ID
    pub uid: String,
    /// Display name, if the account has one
    pub display_name: Option<String>,
    /// Avatar URL
    pub photo_url: Option<String>,
    /// Email address
    pub email: Option<String>,
}

impl Identity {
    /// Best human-readable label: display name, then email, then the uid.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}
