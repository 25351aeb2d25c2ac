//! # studyhub-client
//!
//! The application core UI screens drive: join-request workflow, course chat
//! stream, directory listings, admin operations, profile stats, and local
//! preferences. Screens subscribe to live queries, re-derive view state from
//! each snapshot, and dispatch mutation calls; everything here is written
//! against the injected [`DocumentStore`] seam so tests run on the in-memory
//! reference store.

pub mod admin;
pub mod chat;
pub mod directory;
pub mod join_requests;
pub mod outbox;
pub mod prefs;
pub mod profile;
pub mod reconcile;

use std::sync::Arc;

use studyhub_store::DocumentStore;

use crate::admin::AdminService;
use crate::chat::ChatService;
use crate::directory::DirectoryService;
use crate::join_requests::JoinRequestService;
use crate::outbox::Outbox;
use crate::profile::ProfileService;
use crate::reconcile::ReconciliationQueue;

/// Entry point tying the services to one store handle.
///
/// Cheap to clone-from: each accessor hands out a service sharing the same
/// store, outbox, and reconciliation queue.
pub struct StudyClient {
    store: Arc<dyn DocumentStore>,
    outbox: Outbox,
    reconcile: ReconciliationQueue,
}

impl StudyClient {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            outbox: Outbox::default(),
            reconcile: ReconciliationQueue::default(),
        }
    }

    pub fn join_requests(&self) -> JoinRequestService {
        JoinRequestService::new(Arc::clone(&self.store), self.reconcile.clone())
    }

    pub fn chat(&self) -> ChatService {
        ChatService::new(Arc::clone(&self.store), self.outbox.clone())
    }

    pub fn directory(&self) -> DirectoryService {
        DirectoryService::new(Arc::clone(&self.store))
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(Arc::clone(&self.store))
    }

    pub fn profile(&self) -> ProfileService {
        ProfileService::new(Arc::clone(&self.store))
    }

    /// Tasks left behind by partially-failed multi-document operations.
    pub fn reconciliation(&self) -> &ReconciliationQueue {
        &self.reconcile
    }
}
