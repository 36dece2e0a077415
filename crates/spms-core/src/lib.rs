//! SPMS Core Library
//!
//! Record-keeping core for a nurse and patient management client, layered
//! over an external managed document store.
//!
//! # Architecture
//!
//! ```text
//! create(draft) ──► repository ──► code allocator (single-doc transaction)
//!                       │
//!                       ├──► nurse/patient document, keyed by code
//!                       └──► credential document (nurse only, linked
//!                            by nurseCode; kept in sync on update/delete)
//!
//! login(email, password) ──► credential query ──► digest comparison
//!
//! watch_all() ──► full-list snapshots from the store's change feed
//! ```
//!
//! # Core Principle
//!
//! **Codes are unique and immutable.** Every record key comes from the
//! sequential allocator; nothing else ever writes a counter, and a code is
//! never reassigned.
//!
//! # Modules
//!
//! - [`store`]: document-store boundary and in-memory implementation
//! - [`models`]: domain types (Nurse, Patient, User, Gender, Role)
//! - [`repo`]: repositories and the sequential code allocator
//! - [`digest`]: one-way password digest
//! - [`validate`]: form field validators

pub mod digest;
pub mod models;
pub mod repo;
pub mod store;
pub mod validate;

// Re-export commonly used types
pub use models::{Gender, Nurse, NurseDraft, Patient, PatientDraft, Role, User};
pub use repo::{
    format_code, AuthRepository, CounterKind, CounterRepository, HasCode, NurseRepository,
    PatientRepository, RecordFeed, RepoError, RepoResult,
};
pub use store::{
    Document, DocumentStore, MemoryStore, StoreError, StoreResult, Subscription,
};
pub use validate::ValidationError;

use std::sync::Arc;

/// Entry point wiring the repositories to one injected store handle.
///
/// The store client is an explicit dependency, constructed by the caller and
/// shared by every repository; there is no ambient global connection.
pub struct SpmsCore {
    nurses: NurseRepository,
    patients: PatientRepository,
    auth: AuthRepository,
}

impl SpmsCore {
    /// Build the core on top of the given store client.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let counters = CounterRepository::new(Arc::clone(&store));
        Self {
            nurses: NurseRepository::new(Arc::clone(&store), counters.clone()),
            patients: PatientRepository::new(Arc::clone(&store), counters),
            auth: AuthRepository::new(store),
        }
    }

    /// Core backed by an in-memory store (for testing).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn nurses(&self) -> &NurseRepository {
        &self.nurses
    }

    pub fn patients(&self) -> &PatientRepository {
        &self.patients
    }

    pub fn auth(&self) -> &AuthRepository {
        &self.auth
    }
}
