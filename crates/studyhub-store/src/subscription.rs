//! Live query subscriptions.
//!
//! A subscription is a standing request: the store pushes a fresh
//! [`QuerySnapshot`] for every commit that touches the queried collection.
//! Dropping the subscription tears it down; screens rely on that when they
//! unmount.

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::document::Document;
use crate::StoreResult;

/// The full result set of a live query as of one commit.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub docs: Vec<Document>,
}

impl QuerySnapshot {
    /// Deserialize every document in the snapshot.
    pub fn to_models<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        self.docs.iter().map(Document::to_model).collect()
    }
}

/// Handle to a live query. Snapshots arrive in commit order for this
/// subscription; there is no ordering guarantee across subscriptions.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<QuerySnapshot>,
    // invoked once when the handle is dropped
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<QuerySnapshot>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Wait for the next snapshot. Returns `None` once the store side has
    /// gone away.
    pub async fn next(&mut self) -> Option<QuerySnapshot> {
        self.rx.recv().await
    }

    /// Non-blocking poll for an already-delivered snapshot.
    pub fn try_next(&mut self) -> Option<QuerySnapshot> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
