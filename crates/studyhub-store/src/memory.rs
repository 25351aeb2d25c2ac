//! In-process reference implementation of [`DocumentStore`].
//!
//! Backs the client crate's tests and local operation. Notification happens
//! synchronously under the write lock, so each subscription observes
//! snapshots in commit order. One-shot write faults can be injected per
//! collection to exercise the partial-failure paths of multi-document
//! operations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use studyhub_common::error::StoreError;
use studyhub_common::ids;

use crate::document::Document;
use crate::query::Query;
use crate::subscription::{QuerySnapshot, Subscription};
use crate::write::FieldWrite;
use crate::{DocumentStore, StoreResult};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    watchers: HashMap<u64, Watcher>,
    next_watcher_id: u64,
    fail_next: HashSet<String>,
}

struct Watcher {
    query: Query,
    tx: mpsc::UnboundedSender<QuerySnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next mutating call on `collection` fail with
    /// [`StoreError::Unavailable`]. One-shot; used by tests to exercise
    /// partial failures of sequential multi-document writes.
    pub fn fail_next_write(&self, collection: &str) {
        self.lock().fail_next.insert(collection.to_string());
    }

    #[cfg(test)]
    fn watcher_count(&self) -> usize {
        self.lock().watchers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn take_fault(&mut self, collection: &str) -> StoreResult<()> {
        if self.fail_next.remove(collection) {
            warn!(collection, "failing write, injected fault consumed");
            return Err(StoreError::Unavailable {
                message: format!("injected write failure on {collection}"),
            });
        }
        Ok(())
    }

    /// Apply field writes over `base` and store the result.
    fn write(
        &mut self,
        collection: &str,
        id: &str,
        base: Map<String, Value>,
        fields: Vec<FieldWrite>,
    ) -> Document {
        let now = Utc::now();
        let mut data = base;
        for (field, op) in fields {
            let next = op.apply(data.get(&field), now);
            data.insert(field, next);
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data.clone());
        Document::new(id, data)
    }

    /// Push a fresh snapshot to every watcher of `collection`, dropping
    /// watchers whose receiving side has gone away.
    fn notify(&mut self, collection: &str) {
        let Inner {
            collections,
            watchers,
            ..
        } = self;
        watchers.retain(|id, watcher| {
            if watcher.query.collection != collection {
                return true;
            }
            let snapshot = evaluate(collections, &watcher.query);
            let alive = watcher.tx.send(snapshot).is_ok();
            if !alive {
                debug!(watcher_id = *id, collection, "pruning closed watcher");
            }
            alive
        });
    }
}

fn evaluate(
    collections: &HashMap<String, BTreeMap<String, Map<String, Value>>>,
    query: &Query,
) -> QuerySnapshot {
    let mut docs: Vec<Document> = collections
        .get(&query.collection)
        .map(|coll| {
            coll.iter()
                .filter(|(_, data)| query.matches(data))
                .map(|(id, data)| Document::new(id.clone(), data.clone()))
                .collect()
        })
        .unwrap_or_default();
    query.arrange(&mut docs);
    QuerySnapshot { docs }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Vec<FieldWrite>) -> StoreResult<Document> {
        let mut inner = self.lock();
        inner.take_fault(collection)?;
        let id = ids::generate_id();
        let doc = inner.write(collection, &id, Map::new(), fields);
        inner.notify(collection);
        Ok(doc)
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: Vec<FieldWrite>,
    ) -> StoreResult<Document> {
        let mut inner = self.lock();
        inner.take_fault(collection)?;
        let doc = inner.write(collection, id, Map::new(), fields);
        inner.notify(collection);
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let inner = self.lock();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|coll| coll.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn update(&self, collection: &str, id: &str, fields: Vec<FieldWrite>) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.take_fault(collection)?;
        let base = inner
            .collections
            .get(collection)
            .and_then(|coll| coll.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        inner.write(collection, id, base, fields);
        inner.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.take_fault(collection)?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|coll| coll.remove(id))
            .is_some();
        if removed {
            inner.notify(collection);
        }
        Ok(())
    }

    async fn get_docs(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let inner = self.lock();
        Ok(evaluate(&inner.collections, query).docs)
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        let inner = self.lock();
        Ok(evaluate(&inner.collections, query).docs.len() as u64)
    }

    fn subscribe(&self, query: Query) -> StoreResult<Subscription> {
        let mut inner = self.lock();
        let id = inner.next_watcher_id;
        inner.next_watcher_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        // initial snapshot, before any further commit can interleave
        let initial = evaluate(&inner.collections, &query);
        let _ = tx.send(initial);
        inner.watchers.insert(id, Watcher { query, tx });

        let registry = Arc::clone(&self.inner);
        Ok(Subscription::new(rx, move || {
            let mut inner = registry.lock().unwrap_or_else(PoisonError::into_inner);
            inner.watchers.remove(&id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::{array_union, increment, server_timestamp, set};
    use crate::Direction;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_id_and_resolves_server_timestamps() {
        let store = MemoryStore::new();
        let doc = store
            .create(
                "courses",
                vec![set("name", json!("Biology")), server_timestamp("createdAt")],
            )
            .await
            .unwrap();

        assert!(!doc.id.is_empty());
        let created_at = doc.data.get("createdAt").and_then(Value::as_str).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    }

    #[tokio::test]
    async fn update_missing_document_is_an_error() {
        let store = MemoryStore::new();
        let err = store
            .update("courses", "nope", vec![set("name", json!("x"))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn subscription_gets_initial_then_commit_ordered_snapshots() {
        let store = MemoryStore::new();
        let mut sub = store
            .subscribe(Query::collection("courses").order_by("name", Direction::Asc))
            .unwrap();

        let initial = sub.next().await.unwrap();
        assert!(initial.docs.is_empty());

        store
            .create("courses", vec![set("name", json!("Algebra"))])
            .await
            .unwrap();
        store
            .create("courses", vec![set("name", json!("Biology"))])
            .await
            .unwrap();

        let first = sub.next().await.unwrap();
        assert_eq!(first.docs.len(), 1);
        let second = sub.next().await.unwrap();
        assert_eq!(second.docs.len(), 2);
        assert_eq!(
            second.docs[1].data.get("name").unwrap(),
            &json!("Biology")
        );
    }

    #[tokio::test]
    async fn subscription_only_sees_matching_documents() {
        let store = MemoryStore::new();
        let mut sub = store
            .subscribe(
                Query::collection("joinRequests").filter_eq("status", json!("pending")),
            )
            .unwrap();
        sub.next().await.unwrap(); // initial

        store
            .create("joinRequests", vec![set("status", json!("rejected"))])
            .await
            .unwrap();
        // notification happens under the write lock, so the snapshot is
        // already queued
        let snap = sub.try_next().unwrap();
        assert!(snap.docs.is_empty());

        store
            .create("joinRequests", vec![set("status", json!("pending"))])
            .await
            .unwrap();
        let snap = sub.next().await.unwrap();
        assert_eq!(snap.docs.len(), 1);
    }

    #[tokio::test]
    async fn dropping_a_subscription_unsubscribes() {
        let store = MemoryStore::new();
        let sub = store.subscribe(Query::collection("courses")).unwrap();
        assert_eq!(store.watcher_count(), 1);
        drop(sub);
        assert_eq!(store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn array_union_and_increment_apply_in_place() {
        let store = MemoryStore::new();
        let doc = store
            .create(
                "courses",
                vec![set("members", json!(["u1"])), set("enrolledCount", json!(1))],
            )
            .await
            .unwrap();

        store
            .update(
                "courses",
                &doc.id,
                vec![
                    array_union("members", json!("u2")),
                    array_union("members", json!("u1")),
                    increment("enrolledCount", 1),
                ],
            )
            .await
            .unwrap();

        let doc = store.get("courses", &doc.id).await.unwrap().unwrap();
        assert_eq!(doc.data.get("members").unwrap(), &json!(["u1", "u2"]));
        assert_eq!(doc.data.get("enrolledCount").unwrap(), &json!(2));
    }

    #[tokio::test]
    async fn injected_fault_fails_exactly_one_write() {
        let store = MemoryStore::new();
        store.fail_next_write("courses");

        let err = store
            .create("courses", vec![set("name", json!("x"))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));

        // next write goes through
        store
            .create("courses", vec![set("name", json!("x"))])
            .await
            .unwrap();
    }
}
