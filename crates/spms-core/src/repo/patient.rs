//! Patient repository.
//!
//! Plain per-document CRUD; patients have no linked credential.

use std::sync::Arc;

use super::{
    collections, decode_sorted, CounterKind, CounterRepository, RecordFeed, RepoError, RepoResult,
};
use crate::models::{Patient, PatientDraft};
use crate::store::{from_document, to_document, DocumentStore};

pub struct PatientRepository {
    store: Arc<dyn DocumentStore>,
    counters: CounterRepository,
}

impl PatientRepository {
    pub fn new(store: Arc<dyn DocumentStore>, counters: CounterRepository) -> Self {
        Self { store, counters }
    }

    /// All patient records, ascending by code.
    pub async fn list_all(&self) -> RepoResult<Vec<Patient>> {
        decode_sorted(self.store.list(collections::PATIENTS).await?)
    }

    /// Allocate a code and persist the record.
    pub async fn create(&self, draft: PatientDraft) -> RepoResult<Patient> {
        draft.validate()?;

        let code = self.counters.next_code(CounterKind::Patient).await?;
        let patient = draft.into_record(code.clone());
        let doc = to_document(&patient)?;
        self.store.set(collections::PATIENTS, &code, doc).await?;

        tracing::info!(code = %code, "created patient record");
        Ok(patient)
    }

    /// Overwrite a patient record; the code never changes.
    pub async fn update(&self, patient: &Patient) -> RepoResult<()> {
        self.store
            .get(collections::PATIENTS, &patient.code)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("patient {}", patient.code)))?;

        let doc = to_document(patient)?;
        self.store
            .set(collections::PATIENTS, &patient.code, doc)
            .await?;

        tracing::debug!(code = %patient.code, "updated patient record");
        Ok(())
    }

    /// Remove a patient record by code.
    pub async fn delete(&self, code: &str) -> RepoResult<()> {
        self.store.delete(collections::PATIENTS, code).await?;
        tracing::info!(code, "deleted patient record");
        Ok(())
    }

    pub async fn get_by_code(&self, code: &str) -> RepoResult<Option<Patient>> {
        match self.store.get(collections::PATIENTS, code).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Realtime feed of the patient list, sorted by code.
    pub fn watch_all(&self) -> RepoResult<RecordFeed<Patient>> {
        Ok(RecordFeed::new(self.store.subscribe(collections::PATIENTS)?))
    }
}
