//! Reconciliation tasks for partially-failed multi-document operations.
//!
//! No write here spans more than one document, so a sequence like
//! approve-join (course write, then request write) can fail halfway. Instead
//! of leaving that inconsistency silent, the failing service records a task
//! describing the remaining write so an admin surface can retry it.

use std::sync::{Arc, Mutex, PoisonError};

/// A follow-up write still owed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileTask {
    /// Membership was granted but the join request is still marked pending;
    /// only the status write remains.
    FinishApproval { request_id: String },
}

impl ReconcileTask {
    fn request_id(&self) -> &str {
        match self {
            Self::FinishApproval { request_id } => request_id,
        }
    }
}

/// Shared queue of outstanding reconciliation tasks.
#[derive(Clone, Default)]
pub struct ReconciliationQueue {
    inner: Arc<Mutex<Vec<ReconcileTask>>>,
}

impl ReconciliationQueue {
    pub fn push(&self, task: ReconcileTask) {
        let mut tasks = self.lock();
        if !tasks.contains(&task) {
            tasks.push(task);
        }
    }

    /// Current outstanding tasks, oldest first.
    pub fn tasks(&self) -> Vec<ReconcileTask> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop tasks belonging to a request once its missing write has landed.
    pub fn resolve(&self, request_id: &str) {
        self.lock().retain(|t| t.request_id() != request_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReconcileTask>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
