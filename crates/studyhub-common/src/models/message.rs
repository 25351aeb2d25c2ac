//! Message model: a chat message in a course's message sub-collection.
//!
//! Messages are append-only from the send path; pin toggles and reaction
//! toggles mutate them in place, and only the original sender may delete one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document from a `courses/{id}/messages` sub-collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,

    pub sender_id: String,

    #[serde(default)]
    pub sender_name: String,

    pub content: String,

    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Server-assigned send time
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// One entry per (user, emoji); a user may hold several distinct-emoji
    /// reactions but at most one of each emoji.
    #[serde(default)]
    pub reactions: Vec<Reaction>,

    #[serde(default)]
    pub pinned: bool,
}

impl Message {
    pub fn has_reaction(&self, user_id: &str, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji == emoji)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text, the only kind the send path produces today
    Text,
    File,
    Video,
}

/// Emoji reaction on a message, keyed by (user, emoji).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: String,
    pub emoji: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_reaction_matches_exact_pair() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "senderId": "u1",
            "content": "hi",
            "type": "text",
            "reactions": [
                { "userId": "u1", "emoji": "👍" },
                { "userId": "u2", "emoji": "❤️" },
            ],
        }))
        .unwrap();

        assert!(msg.has_reaction("u1", "👍"));
        assert!(!msg.has_reaction("u1", "❤️"));
        assert!(!msg.has_reaction("u3", "👍"));
    }
}
