//! Per-user profile settings, stored apart from the identity record.

use super::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile document in the `profile` collection (document ID = user ID).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub occupation: String,
    /// Whether the "create article" affordance is shown to this user
    #[serde(default)]
    pub show_create_news_button: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Profile used when the user has never saved one.
    pub fn defaults_for(identity: &Identity) -> Self {
        Self {
            email: identity.email.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Fill a blank contact email from the identity.
    pub fn with_email_fallback(mut self, identity: &Identity) -> Self {
        if self.email.trim().is_empty() {
            self.email = identity.email.clone().unwrap_or_default();
        }
        self
    }

    /// "First Last", or `None` when both are blank.
    pub fn full_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Settings form submitted by the user. Saving replaces the whole profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub occupation: String,
    #[serde(default)]
    pub show_create_news_button: bool,
}

impl ProfileForm {
    /// Build the stored document, stamped with the owner and save time.
    pub fn into_profile(self, identity: &Identity, now: DateTime<Utc>) -> Profile {
        Profile {
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            phone_number: self.phone_number,
            email: self.email,
            birth_date: self.birth_date,
            occupation: self.occupation,
            show_create_news_button: self.show_create_news_button,
            user_id: Some(identity.uid.clone()),
            user_email: identity.email.clone(),
            created_at: Some(now),
        }
    }
}

/// Profile as returned to the front-end.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub phone_number: String,
    pub email: String,
    pub birth_date: String,
    pub occupation: String,
    pub show_create_news_button: bool,
    /// False when the values are identity-derived defaults
    pub saved: bool,
}

impl ProfileResponse {
    pub fn new(profile: Profile, saved: bool) -> Self {
        Self {
            first_name: profile.first_name,
            last_name: profile.last_name,
            gender: profile.gender,
            phone_number: profile.phone_number,
            email: profile.email,
            birth_date: profile.birth_date,
            occupation: profile.occupation,
            show_create_news_button: profile.show_create_news_button,
            saved,
        }
    }
}
