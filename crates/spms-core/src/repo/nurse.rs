//! Nurse repository.
//!
//! The one place with a cross-entity invariant: every nurse record has a
//! matching login credential, linked by `nurseCode`. Create, update and
//! delete all keep the pair in sync by hand; the store enforces nothing.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{
    collections, decode_sorted, normalize_email, release_email, reserve_email, CounterKind,
    CounterRepository, RecordFeed, RepoError, RepoResult,
};
use crate::digest::sha256_hex;
use crate::models::{Nurse, NurseDraft, User};
use crate::store::{from_document, to_document, DocumentStore};

pub struct NurseRepository {
    store: Arc<dyn DocumentStore>,
    counters: CounterRepository,
}

impl NurseRepository {
    pub fn new(store: Arc<dyn DocumentStore>, counters: CounterRepository) -> Self {
        Self { store, counters }
    }

    /// All nurse records, ascending by code.
    pub async fn list_all(&self) -> RepoResult<Vec<Nurse>> {
        decode_sorted(self.store.list(collections::NURSES).await?)
    }

    /// Create a nurse together with its login credential.
    ///
    /// The email is claimed transactionally before anything else is written,
    /// so two concurrent creates with the same address cannot both succeed.
    /// If a later step fails, the documents written so far are removed again
    /// (best effort) before the error propagates.
    pub async fn create(&self, draft: NurseDraft, plain_password: &str) -> RepoResult<Nurse> {
        draft.validate()?;

        // Legacy duplicate check against the credentials themselves; covers
        // accounts that predate the email index.
        let taken = self
            .store
            .query_eq(collections::USERS, "email", &json!(draft.email), Some(1))
            .await?;
        if !taken.is_empty() {
            return Err(RepoError::DuplicateEmail(draft.email.clone()));
        }

        reserve_email(self.store.as_ref(), &draft.email).await?;

        let code = match self.counters.next_code(CounterKind::Nurse).await {
            Ok(code) => code,
            Err(err) => {
                self.undo_create(&draft.email, None).await;
                return Err(err);
            }
        };

        let nurse = draft.into_record(code.clone());
        let nurse_doc = match to_document(&nurse) {
            Ok(doc) => doc,
            Err(err) => {
                self.undo_create(&nurse.email, None).await;
                return Err(err.into());
            }
        };
        if let Err(err) = self.store.set(collections::NURSES, &code, nurse_doc).await {
            self.undo_create(&nurse.email, None).await;
            return Err(err.into());
        }

        let user = User::new_nurse(nurse.email.clone(), sha256_hex(plain_password), code.clone());
        let user_doc = match to_document(&user) {
            Ok(doc) => doc,
            Err(err) => {
                self.undo_create(&nurse.email, Some(&code)).await;
                return Err(err.into());
            }
        };
        if let Err(err) = self.store.add(collections::USERS, user_doc).await {
            self.undo_create(&nurse.email, Some(&code)).await;
            return Err(err.into());
        }

        tracing::info!(code = %code, "created nurse record");
        Ok(nurse)
    }

    /// Best-effort cleanup after a partial create.
    async fn undo_create(&self, email: &str, nurse_code: Option<&str>) {
        if let Some(code) = nurse_code {
            if let Err(err) = self.store.delete(collections::NURSES, code).await {
                tracing::warn!(code, "failed to roll back nurse record: {err}");
            }
        }
        if let Err(err) = release_email(self.store.as_ref(), email).await {
            tracing::warn!("failed to release email claim: {err}");
        }
    }

    /// Overwrite a nurse record; the code never changes.
    ///
    /// When the email changed and the previous one was non-empty, the linked
    /// credential's `email` field is updated in place (a silent no-op when no
    /// credential matches) and the email claim moves to the new address.
    pub async fn update(&self, nurse: &Nurse) -> RepoResult<()> {
        let previous = self
            .store
            .get(collections::NURSES, &nurse.code)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("nurse {}", nurse.code)))?;
        let previous: Nurse = from_document(previous)?;

        let email_changed = !previous.email.is_empty() && previous.email != nurse.email;
        // A case-only change keeps the same normalized claim.
        let claim_moves =
            email_changed && normalize_email(&previous.email) != normalize_email(&nurse.email);

        if claim_moves {
            reserve_email(self.store.as_ref(), &nurse.email).await?;
        }

        let doc = to_document(nurse)?;
        if let Err(err) = self.store.set(collections::NURSES, &nurse.code, doc).await {
            if claim_moves {
                if let Err(release_err) = release_email(self.store.as_ref(), &nurse.email).await {
                    tracing::warn!("failed to release email claim: {release_err}");
                }
            }
            return Err(err.into());
        }

        if email_changed {
            let linked = self
                .store
                .query_eq(collections::USERS, "nurseCode", &json!(nurse.code), Some(1))
                .await?;
            if let Some((key, _)) = linked.into_iter().next() {
                self.store
                    .update_field(collections::USERS, &key, "email", json!(nurse.email))
                    .await?;
            }
            if claim_moves {
                release_email(self.store.as_ref(), &previous.email).await?;
            }
        }

        tracing::debug!(code = %nurse.code, "updated nurse record");
        Ok(())
    }

    /// Delete a nurse and every credential that references its code.
    pub async fn delete(&self, code: &str) -> RepoResult<()> {
        self.store.delete(collections::NURSES, code).await?;

        // Expected to be at most one, but sweep all matches.
        let linked = self
            .store
            .query_eq(collections::USERS, "nurseCode", &json!(code), None)
            .await?;
        for (key, doc) in linked {
            self.store.delete(collections::USERS, &key).await?;
            if let Some(email) = doc.get("email").and_then(Value::as_str) {
                release_email(self.store.as_ref(), email).await?;
            }
        }

        tracing::info!(code, "deleted nurse record");
        Ok(())
    }

    pub async fn get_by_code(&self, code: &str) -> RepoResult<Option<Nurse>> {
        match self.store.get(collections::NURSES, code).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Realtime feed of the nurse list, sorted by code.
    pub fn watch_all(&self) -> RepoResult<RecordFeed<Nurse>> {
        Ok(RecordFeed::new(self.store.subscribe(collections::NURSES)?))
    }
}
