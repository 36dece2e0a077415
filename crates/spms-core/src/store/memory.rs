//! In-memory document store.
//!
//! Backs the test suite and local development. Transactions are serialized
//! by a single process-wide lock, which trivially satisfies the
//! single-document isolation the [`DocumentStore`] contract asks for.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use super::{
    CollectionSnapshot, Document, DocumentStore, StoreError, StoreResult, Subscription,
    TxDecision, TxFn,
};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Document>>,
    feeds: HashMap<String, watch::Sender<CollectionSnapshot>>,
}

impl Inner {
    fn snapshot(&self, collection: &str) -> CollectionSnapshot {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, doc)| (key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push the current snapshot to subscribers, if any.
    fn publish(&self, collection: &str) {
        if let Some(tx) = self.feeds.get(collection) {
            tx.send_replace(self.snapshot(collection));
        }
    }
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Transient("store lock poisoned".into()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let inner = self.lock()?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn list(&self, collection: &str) -> StoreResult<CollectionSnapshot> {
        let inner = self.lock()?;
        Ok(inner.snapshot(collection))
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> StoreResult<CollectionSnapshot> {
        let inner = self.lock()?;
        let mut matches = Vec::new();
        if let Some(docs) = inner.collections.get(collection) {
            for (key, doc) in docs {
                if doc.get(field) == Some(value) {
                    matches.push((key.clone(), doc.clone()));
                    if limit.is_some_and(|n| matches.len() >= n) {
                        break;
                    }
                }
            }
        }
        Ok(matches)
    }

    async fn set(&self, collection: &str, key: &str, doc: Document) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        inner.publish(collection);
        Ok(())
    }

    async fn add(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let key = Uuid::new_v4().to_string();
        self.set(collection, &key, doc).await?;
        Ok(key)
    }

    async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Value,
    ) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let updated = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .map(|doc| doc.insert(field.to_string(), value))
            .is_some();
        if updated {
            inner.publish(collection);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .is_some();
        if removed {
            inner.publish(collection);
        }
        Ok(())
    }

    async fn transact(
        &self,
        collection: &str,
        key: &str,
        f: TxFn<'_>,
    ) -> StoreResult<Option<Document>> {
        let mut inner = self.lock()?;
        let current = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key));
        match f(current) {
            TxDecision::Write(doc) => {
                inner
                    .collections
                    .entry(collection.to_string())
                    .or_default()
                    .insert(key.to_string(), doc.clone());
                inner.publish(collection);
                Ok(Some(doc))
            }
            TxDecision::Abort => Ok(None),
        }
    }

    fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        let mut inner = self.lock()?;
        let initial = inner.snapshot(collection);
        let tx = inner
            .feeds
            .entry(collection.to_string())
            .or_insert_with(|| watch::channel(initial).0);
        Ok(Subscription::new(tx.subscribe()))
    }
}
