//! Sequential code allocation.

use std::sync::Arc;

use serde_json::Value;

use super::{collections, RepoResult};
use crate::store::{Document, DocumentStore, StoreError, TxDecision};

/// Minimum width of the numeric part of a code. Sequence numbers past 999
/// keep their natural width ("PRW1000"); the numeric value stays unique.
const CODE_PAD: usize = 3;

const LAST_NUMBER: &str = "lastNumber";

/// Which persistent counter a code is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Nurse,
    Patient,
}

impl CounterKind {
    /// Code prefix for this entity type.
    pub fn prefix(self) -> &'static str {
        match self {
            CounterKind::Nurse => "PRW",
            CounterKind::Patient => "PSN",
        }
    }

    /// Key of the persistent counter document.
    pub fn counter_key(self) -> &'static str {
        match self {
            CounterKind::Nurse => "nurseCounter",
            CounterKind::Patient => "patientCounter",
        }
    }
}

/// Format a sequence number as a human-readable code.
pub fn format_code(kind: CounterKind, number: u64) -> String {
    format!("{}{:0width$}", kind.prefix(), number, width = CODE_PAD)
}

/// Allocates collision-free sequential codes from per-entity counters.
#[derive(Clone)]
pub struct CounterRepository {
    store: Arc<dyn DocumentStore>,
}

impl CounterRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Allocate the next code for the given entity type.
    ///
    /// A single-document transaction reads the counter (absent reads as 0),
    /// increments it and writes it back; the store serializes concurrent
    /// transactions, so two allocations never return the same code. No code
    /// is consumed when the transaction fails.
    pub async fn next_code(&self, kind: CounterKind) -> RepoResult<String> {
        let advance = |current: Option<&Document>| {
            let last = current
                .and_then(|doc| doc.get(LAST_NUMBER))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let mut next = Document::new();
            next.insert(LAST_NUMBER.to_string(), serde_json::json!(last + 1));
            TxDecision::Write(next)
        };
        let committed = self
            .store
            .transact(collections::COUNTERS, kind.counter_key(), &advance)
            .await?
            .ok_or_else(|| StoreError::Transient("counter transaction aborted".into()))?;
        let number = committed
            .get(LAST_NUMBER)
            .and_then(Value::as_u64)
            .ok_or_else(|| StoreError::Transient("counter document corrupt".into()))?;
        Ok(format_code(kind, number))
    }
}
