//! Repositories over the document store.

mod auth;
mod counter;
mod nurse;
mod patient;

pub use auth::AuthRepository;
pub use counter::{format_code, CounterKind, CounterRepository};
pub use nurse::NurseRepository;
pub use patient::PatientRepository;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Nurse, Patient};
use crate::store::{
    from_document, CollectionSnapshot, Document, DocumentStore, StoreError, Subscription,
    TxDecision,
};
use crate::validate::ValidationError;

/// Collection names in the backing store.
pub mod collections {
    pub const NURSES: &str = "nurses";
    pub const PATIENTS: &str = "patients";
    pub const USERS: &str = "users";
    pub const COUNTERS: &str = "counters";
    /// One reservation document per normalized email, keyed by that email.
    /// Guards credential-email uniqueness without a store-level index.
    pub const EMAIL_INDEX: &str = "emailIndex";
}

/// Repository errors.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Failure talking to the store; retryable by re-invoking the operation.
    #[error("failed to save or load data: {0}")]
    Store(#[from] StoreError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Records keyed by an allocator-assigned code.
pub trait HasCode {
    fn code(&self) -> &str;
}

impl HasCode for Nurse {
    fn code(&self) -> &str {
        &self.code
    }
}

impl HasCode for Patient {
    fn code(&self) -> &str {
        &self.code
    }
}

/// Lowercased, trimmed form of an email used for uniqueness checks.
pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Claim an email in the uniqueness index.
///
/// The claim is a single-document transaction keyed by the normalized email,
/// so two concurrent claims of the same address cannot both succeed.
pub(crate) async fn reserve_email(store: &dyn DocumentStore, email: &str) -> RepoResult<()> {
    let key = normalize_email(email);
    let mut claim = Document::new();
    claim.insert("email".to_string(), serde_json::json!(email));
    let committed = store
        .transact(collections::EMAIL_INDEX, &key, &|current| {
            if current.is_some() {
                TxDecision::Abort
            } else {
                TxDecision::Write(claim.clone())
            }
        })
        .await?;
    if committed.is_none() {
        return Err(RepoError::DuplicateEmail(email.to_string()));
    }
    Ok(())
}

/// Drop an email claim from the uniqueness index.
pub(crate) async fn release_email(store: &dyn DocumentStore, email: &str) -> RepoResult<()> {
    store
        .delete(collections::EMAIL_INDEX, &normalize_email(email))
        .await?;
    Ok(())
}

/// Decode a collection snapshot and sort ascending by code. The sort is a
/// pure post-fetch step; the store guarantees no order.
pub(crate) fn decode_sorted<T>(snapshot: CollectionSnapshot) -> RepoResult<Vec<T>>
where
    T: DeserializeOwned + HasCode,
{
    let mut records = snapshot
        .into_iter()
        .map(|(_, doc)| from_document(doc))
        .collect::<Result<Vec<T>, _>>()?;
    records.sort_by(|a, b| a.code().cmp(b.code()));
    Ok(records)
}

/// Cancellable feed of full-list snapshots, decoded and sorted by code.
///
/// Each delivery replaces the previous list wholesale, matching the store's
/// snapshot semantics; consumers do no merging.
pub struct RecordFeed<T> {
    sub: Subscription,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RecordFeed<T>
where
    T: DeserializeOwned + HasCode,
{
    pub(crate) fn new(sub: Subscription) -> Self {
        Self {
            sub,
            _marker: PhantomData,
        }
    }

    /// The most recent list, without waiting.
    pub fn current(&mut self) -> RepoResult<Vec<T>> {
        decode_sorted(self.sub.current())
    }

    /// Wait for the next change and return the new list. `None` once the
    /// store has gone away.
    pub async fn changed(&mut self) -> Option<RepoResult<Vec<T>>> {
        Some(decode_sorted(self.sub.changed().await?))
    }

    /// Stop receiving updates. Dropping the feed has the same effect.
    pub fn unsubscribe(self) {
        self.sub.unsubscribe();
    }
}
