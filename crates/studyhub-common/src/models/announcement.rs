//! Announcement model: admin-authored broadcasts shown on the home screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A document from the `announcements` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(default)]
    pub id: String,

    pub title: String,

    pub message: String,

    #[serde(rename = "type")]
    pub kind: AnnouncementKind,

    pub priority: Priority,

    pub author_id: String,

    #[serde(default)]
    pub author_name: String,

    #[serde(default)]
    pub author_email: String,

    /// Inactive announcements stay in the collection but are hidden from
    /// regular users.
    pub is_active: bool,

    #[serde(default)]
    pub view_count: i64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    Info,
    Warning,
    Success,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Create announcement request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "Message must be 1-1000 characters"))]
    pub message: String,

    pub kind: AnnouncementKind,

    pub priority: Priority,
}
