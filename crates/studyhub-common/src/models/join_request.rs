//! Join request model: the approval workflow between a user and a course.
//!
//! State machine: `pending → approved` or `pending → rejected`, both terminal.
//! Requests are never deleted; the admin screens filter on status instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document from the `joinRequests` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(default)]
    pub id: String,

    pub user_id: String,

    #[serde(default)]
    pub user_email: String,

    #[serde(default)]
    pub user_name: String,

    pub course_id: String,

    #[serde(default)]
    pub course_name: String,

    pub status: RequestStatus,

    /// Server-assigned creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl JoinRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_as_lowercase() {
        let json = serde_json::to_value(RequestStatus::Approved).unwrap();
        assert_eq!(json, serde_json::json!("approved"));
        let back: RequestStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, RequestStatus::Approved);
    }
}
