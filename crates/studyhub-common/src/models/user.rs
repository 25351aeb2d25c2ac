//! User profile model and the identity handed to us by the external auth
//! provider.
//!
//! Profiles mirror the auth identity at sign-up. Deleting a profile removes
//! the document only; revoking the underlying auth identity requires an
//! external server-side step and is not implemented here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document from the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Matches the auth provider's UID
    #[serde(default)]
    pub id: String,

    pub email: String,

    #[serde(default)]
    pub display_name: String,

    pub role: Role,

    #[serde(default = "default_status")]
    pub status: String,

    /// Informational, denormalized list of course IDs
    #[serde(default)]
    pub courses: Vec<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

/// The signed-in user, as supplied by the external auth provider's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// Display name with the fallback the screens use for blank profiles.
    pub fn name_or_default(&self) -> &str {
        if self.display_name.is_empty() {
            "Unknown User"
        } else {
            &self.display_name
        }
    }
}
