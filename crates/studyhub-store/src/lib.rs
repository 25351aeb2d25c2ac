//! # studyhub-store
//!
//! Document-store layer for StudyHub. Models the capabilities the app relies
//! on from its managed backend: collections of schemaless documents, atomic
//! single-document field updates (including the commutative array-union,
//! array-remove, and increment primitives), server-assigned timestamps, and
//! per-query live subscriptions.
//!
//! The [`DocumentStore`] trait is the injected seam between the client
//! services and whichever backend hosts the data; [`MemoryStore`] is the
//! in-process reference implementation used by tests and local operation.

pub mod document;
pub mod memory;
pub mod query;
pub mod subscription;
pub mod write;

pub use document::Document;
pub use memory::MemoryStore;
pub use query::{Direction, Filter, Query};
pub use subscription::{QuerySnapshot, Subscription};
pub use write::{array_remove, array_union, increment, server_timestamp, set, FieldWrite, WriteOp};

use async_trait::async_trait;
use studyhub_common::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// A remote document database, as seen by the client.
///
/// All mutations are single-document: there are no transactions spanning
/// documents, and plain `Set` writes resolve conflicts last-writer-wins.
/// Only the array/increment primitives commute under concurrent application.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-assigned ID. Returns the stored
    /// document with server timestamps resolved.
    async fn create(&self, collection: &str, fields: Vec<FieldWrite>) -> StoreResult<Document>;

    /// Create or replace a document under a caller-supplied ID (used where an
    /// external system, e.g. the auth provider, owns the ID).
    async fn put(&self, collection: &str, id: &str, fields: Vec<FieldWrite>)
        -> StoreResult<Document>;

    /// Fetch one document. A missing document is `Ok(None)`, not an error.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Apply field updates atomically to one existing document.
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Vec<FieldWrite>) -> StoreResult<()>;

    /// Hard-delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// One-shot query execution.
    async fn get_docs(&self, query: &Query) -> StoreResult<Vec<Document>>;

    /// Server-side count of matching documents.
    async fn count(&self, query: &Query) -> StoreResult<u64>;

    /// Open a live query. The initial result set is delivered immediately;
    /// afterwards a fresh snapshot arrives for every commit that touches the
    /// queried collection, in commit order for this subscription. Dropping
    /// the [`Subscription`] unsubscribes.
    fn subscribe(&self, query: Query) -> StoreResult<Subscription>;
}
