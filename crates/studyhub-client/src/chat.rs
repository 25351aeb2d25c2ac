//! Course chat stream: send, pin, react, delete.
//!
//! Messages live in a per-course sub-collection, append-only from the send
//! path and live-subscribed in ascending send order. Pinned messages float to
//! the top for display only; the underlying store order is untouched.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use studyhub_common::collections::{course_messages, COURSES};
use studyhub_common::config;
use studyhub_common::error::{StudyhubError, StudyhubResult};
use studyhub_common::models::{Identity, Message, MessageKind, Reaction};
use studyhub_store::{
    array_remove, array_union, server_timestamp, set, Direction, DocumentStore, Query,
    Subscription,
};

use crate::outbox::Outbox;

/// Standard palette offered by the reaction picker.
pub const REACTION_EMOJIS: [&str; 6] = ["👍", "❤️", "😂", "😮", "😢", "👏"];

/// Per-emoji aggregate rendered as a reaction badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionBadge {
    pub emoji: String,
    pub count: usize,
    /// Whether the viewing user is among the reactors
    pub reacted: bool,
}

pub struct ChatService {
    store: Arc<dyn DocumentStore>,
    outbox: Outbox,
}

impl ChatService {
    pub fn new(store: Arc<dyn DocumentStore>, outbox: Outbox) -> Self {
        Self { store, outbox }
    }

    /// Live feed over a course's messages, ascending by send time with
    /// pinned messages floated to the top of each snapshot.
    pub fn subscribe(&self, course_id: &str) -> StudyhubResult<MessageFeed> {
        let sub = self.store.subscribe(
            Query::collection(course_messages(course_id)).order_by("timestamp", Direction::Asc),
        )?;
        Ok(MessageFeed { sub })
    }

    /// Send a text message, tracked through the outbox.
    ///
    /// After the message lands, the parent course's `lastMessage` preview is
    /// updated best-effort: a failure there is logged and accepted, never
    /// rolled back against the message itself.
    pub async fn send(
        &self,
        course_id: &str,
        who: &Identity,
        content: &str,
    ) -> StudyhubResult<Message> {
        let content = content.trim();
        validate_content(content)?;

        let local_id = self.outbox.begin(course_id, content);
        self.dispatch(local_id, course_id, who, content).await
    }

    /// Re-attempt a failed send with the content retained in the outbox.
    pub async fn retry(&self, local_id: u64, who: &Identity) -> StudyhubResult<Message> {
        let (course_id, content) =
            self.outbox
                .begin_retry(local_id)
                .ok_or_else(|| StudyhubError::NotFound {
                    resource: "Failed message".into(),
                })?;
        self.dispatch(local_id, &course_id, who, &content).await
    }

    /// Send states for rendering pending/failed bubbles.
    pub fn outbox(&self) -> Vec<crate::outbox::OutboxEntry> {
        self.outbox.entries()
    }

    /// Discard confirmed sends from the outbox, keeping in-flight and failed
    /// entries.
    pub fn prune_outbox(&self) {
        self.outbox.prune_sent();
    }

    /// Flip a message's pinned flag.
    pub async fn toggle_pin(&self, course_id: &str, message: &Message) -> StudyhubResult<()> {
        self.store
            .update(
                &course_messages(course_id),
                &message.id,
                vec![set("pinned", json!(!message.pinned))],
            )
            .await?;
        Ok(())
    }

    /// Toggle the caller's reaction for one emoji.
    ///
    /// The (user, emoji) pair is added or removed with the store's
    /// element-wise array primitives, so two users reacting concurrently
    /// cannot overwrite each other's entries. The local message copy only
    /// decides the direction of the toggle.
    pub async fn toggle_reaction(
        &self,
        course_id: &str,
        message: &Message,
        who: &Identity,
        emoji: &str,
    ) -> StudyhubResult<()> {
        let pair = json!(Reaction {
            user_id: who.id.clone(),
            emoji: emoji.to_string(),
        });
        let op = if message.has_reaction(&who.id, emoji) {
            array_remove("reactions", pair)
        } else {
            array_union("reactions", pair)
        };
        self.store
            .update(&course_messages(course_id), &message.id, vec![op])
            .await?;
        Ok(())
    }

    /// Hard-delete a message. Only the original sender may do this; the check
    /// is client-side, like everything else in this app.
    pub async fn delete(
        &self,
        course_id: &str,
        message: &Message,
        who: &Identity,
    ) -> StudyhubResult<()> {
        if message.sender_id != who.id {
            return Err(StudyhubError::Forbidden);
        }
        self.store
            .delete(&course_messages(course_id), &message.id)
            .await?;
        Ok(())
    }

    async fn dispatch(
        &self,
        local_id: u64,
        course_id: &str,
        who: &Identity,
        content: &str,
    ) -> StudyhubResult<Message> {
        let result = self
            .store
            .create(
                &course_messages(course_id),
                vec![
                    set("senderId", json!(who.id)),
                    set("senderName", json!(who.name_or_default())),
                    set("content", json!(content)),
                    set("type", json!(MessageKind::Text)),
                    server_timestamp("timestamp"),
                    set("reactions", json!([])),
                    set("pinned", json!(false)),
                ],
            )
            .await;

        let doc = match result {
            Ok(doc) => doc,
            Err(err) => {
                self.outbox.mark_failed(local_id);
                return Err(err.into());
            }
        };
        self.outbox.mark_sent(local_id, &doc.id);

        // Denormalized course preview; accepted inconsistency on failure.
        if let Err(err) = self
            .store
            .update(
                COURSES,
                course_id,
                vec![
                    set("lastMessage", json!(content)),
                    server_timestamp("lastMessageTime"),
                ],
            )
            .await
        {
            warn!(course_id, error = %err, "failed to update course message preview");
        }

        Ok(doc.to_model()?)
    }
}

/// Summarize reactions into per-emoji badges, ordered by first appearance.
pub fn reaction_summary(message: &Message, viewer: &Identity) -> Vec<ReactionBadge> {
    let mut badges: Vec<ReactionBadge> = Vec::new();
    for reaction in &message.reactions {
        match badges.iter_mut().find(|b| b.emoji == reaction.emoji) {
            Some(badge) => {
                badge.count += 1;
                badge.reacted |= reaction.user_id == viewer.id;
            }
            None => badges.push(ReactionBadge {
                emoji: reaction.emoji.clone(),
                count: 1,
                reacted: reaction.user_id == viewer.id,
            }),
        }
    }
    badges
}

/// Typed view over a message subscription, applying display order.
pub struct MessageFeed {
    sub: Subscription,
}

impl MessageFeed {
    pub async fn next(&mut self) -> Option<StudyhubResult<Vec<Message>>> {
        let snapshot = self.sub.next().await?;
        Some(
            snapshot
                .to_models::<Message>()
                .map(display_order)
                .map_err(StudyhubError::from),
        )
    }
}

/// Pinned messages first; within each group the incoming (send-time) order is
/// preserved.
fn display_order(messages: Vec<Message>) -> Vec<Message> {
    let (pinned, rest): (Vec<_>, Vec<_>) = messages.into_iter().partition(|m| m.pinned);
    pinned.into_iter().chain(rest).collect()
}

fn validate_content(content: &str) -> StudyhubResult<()> {
    if content.is_empty() {
        return Err(StudyhubError::Validation {
            message: "Message cannot be empty".into(),
        });
    }
    let max = config::get().limits.max_message_length;
    if content.chars().count() > max {
        return Err(StudyhubError::Validation {
            message: format!("Message cannot exceed {max} characters"),
        });
    }
    Ok(())
}
