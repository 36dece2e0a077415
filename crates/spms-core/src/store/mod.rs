//! Document-store boundary.
//!
//! The core never talks to a concrete database; everything goes through the
//! [`DocumentStore`] trait, which models the contract of a managed document
//! database: keyed documents grouped into named collections, equality
//! queries, single-document transactions and a push-based change feed.
//! [`MemoryStore`] is the in-process implementation used for testing.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Transient(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A schemaless document: field names mapped to JSON values.
pub type Document = serde_json::Map<String, Value>;

/// Full contents of a collection, in key order.
pub type CollectionSnapshot = Vec<(String, Document)>;

/// Outcome chosen by a transaction closure.
pub enum TxDecision {
    /// Replace the document with the given contents.
    Write(Document),
    /// Leave the document untouched and abort the transaction.
    Abort,
}

/// Transaction body: sees the current document (if any) and decides.
pub type TxFn<'a> = &'a (dyn Fn(Option<&Document>) -> TxDecision + Send + Sync);

/// Abstract contract of the backing document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by key.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Fetch every document in a collection.
    async fn list(&self, collection: &str) -> StoreResult<CollectionSnapshot>;

    /// Fetch documents whose `field` equals `value`, up to `limit`.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> StoreResult<CollectionSnapshot>;

    /// Upsert a document under the given key.
    async fn set(&self, collection: &str, key: &str, doc: Document) -> StoreResult<()>;

    /// Insert a document under a store-generated key and return the key.
    async fn add(&self, collection: &str, doc: Document) -> StoreResult<String>;

    /// Overwrite one field of an existing document. A no-op when the
    /// document is absent.
    async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Value,
    ) -> StoreResult<()>;

    /// Delete a document. Deleting an absent key is not an error.
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()>;

    /// Serializable read-modify-write of a single document.
    ///
    /// Returns the committed document, or `None` when the closure aborted.
    /// Nothing is written on abort or failure.
    async fn transact(
        &self,
        collection: &str,
        key: &str,
        f: TxFn<'_>,
    ) -> StoreResult<Option<Document>>;

    /// Subscribe to full-snapshot updates of a collection.
    fn subscribe(&self, collection: &str) -> StoreResult<Subscription>;
}

/// Cancellable handle on a collection's change feed.
///
/// Each delivery is a complete snapshot of the collection, replacing the
/// previous one; there are no incremental diffs. Slow consumers only ever
/// observe the latest state.
pub struct Subscription {
    rx: watch::Receiver<CollectionSnapshot>,
}

impl Subscription {
    pub fn new(rx: watch::Receiver<CollectionSnapshot>) -> Self {
        Self { rx }
    }

    /// The most recent snapshot, without waiting.
    pub fn current(&mut self) -> CollectionSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next change and return the new snapshot. `None` once the
    /// store has gone away.
    pub async fn changed(&mut self) -> Option<CollectionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stop receiving updates. Dropping the handle has the same effect.
    pub fn unsubscribe(self) {}
}

/// Serialize a record into a store document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(serde::ser::Error::custom(
            "record did not serialize to an object",
        )),
    }
}

/// Deserialize a store document into a record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(doc))
}
