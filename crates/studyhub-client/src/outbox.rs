//! Per-message send tracking.
//!
//! The chat screen clears its input optimistically, before the store confirms
//! the write. The outbox makes that explicit: every send is recorded as
//! `Sending`, then flipped to `Sent` or `Failed`. Failed entries keep their
//! content so a retry is deterministic instead of depending on what the
//! screen happened to do with the input box.

use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    /// Write dispatched, store has not confirmed yet
    Sending,
    /// Confirmed; the store-assigned message ID
    Sent { message_id: String },
    /// Write failed; content retained for retry
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub local_id: u64,
    pub course_id: String,
    pub content: String,
    pub state: SendState,
}

/// Shared send-state ledger, one per client.
#[derive(Clone, Default)]
pub struct Outbox {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<OutboxEntry>,
}

impl Outbox {
    /// Record a send about to be attempted. Returns the local ID used to
    /// settle the entry later.
    pub fn begin(&self, course_id: &str, content: &str) -> u64 {
        let mut inner = self.lock();
        let local_id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(OutboxEntry {
            local_id,
            course_id: course_id.to_string(),
            content: content.to_string(),
            state: SendState::Sending,
        });
        local_id
    }

    pub fn mark_sent(&self, local_id: u64, message_id: &str) {
        self.settle(local_id, SendState::Sent {
            message_id: message_id.to_string(),
        });
    }

    pub fn mark_failed(&self, local_id: u64) {
        self.settle(local_id, SendState::Failed);
    }

    /// Move a failed entry back to `Sending` and hand out its content.
    /// Returns `None` if the entry is unknown or not in a retryable state.
    pub fn begin_retry(&self, local_id: u64) -> Option<(String, String)> {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .iter_mut()
            .find(|e| e.local_id == local_id && e.state == SendState::Failed)?;
        entry.state = SendState::Sending;
        Some((entry.course_id.clone(), entry.content.clone()))
    }

    /// Snapshot of all tracked sends, oldest first.
    pub fn entries(&self) -> Vec<OutboxEntry> {
        self.lock().entries.clone()
    }

    /// Drop confirmed entries. `Sending` and `Failed` entries stay; the chat
    /// screen calls this so the ledger does not grow with every message ever
    /// sent.
    pub fn prune_sent(&self) {
        self.lock()
            .entries
            .retain(|e| !matches!(e.state, SendState::Sent { .. }));
    }

    /// Entries still awaiting a retry.
    pub fn failed(&self) -> Vec<OutboxEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.state == SendState::Failed)
            .cloned()
            .collect()
    }

    fn settle(&self, local_id: u64, state: SendState) {
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.iter_mut().find(|e| e.local_id == local_id) {
            entry.state = state;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_entry_keeps_content_and_is_retryable() {
        let outbox = Outbox::default();
        let id = outbox.begin("c1", "hello");
        outbox.mark_failed(id);

        let failed = outbox.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].content, "hello");

        let (course_id, content) = outbox.begin_retry(id).unwrap();
        assert_eq!(course_id, "c1");
        assert_eq!(content, "hello");
        assert!(outbox.failed().is_empty());
    }

    #[test]
    fn sent_entries_are_not_retryable() {
        let outbox = Outbox::default();
        let id = outbox.begin("c1", "hello");
        outbox.mark_sent(id, "m1");
        assert!(outbox.begin_retry(id).is_none());
    }

    #[test]
    fn prune_keeps_only_unsettled_and_failed_entries() {
        let outbox = Outbox::default();
        let sent = outbox.begin("c1", "landed");
        outbox.mark_sent(sent, "m1");
        let failed = outbox.begin("c1", "lost");
        outbox.mark_failed(failed);
        let in_flight = outbox.begin("c1", "pending");

        outbox.prune_sent();

        let entries = outbox.entries();
        let ids: Vec<u64> = entries.iter().map(|e| e.local_id).collect();
        assert_eq!(ids, [failed, in_flight]);
        // a failed entry survives pruning and is still retryable
        assert!(outbox.begin_retry(failed).is_some());
    }
}
