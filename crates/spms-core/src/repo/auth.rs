//! Authentication lookup.

use std::sync::Arc;

use serde_json::json;

use super::{collections, release_email, reserve_email, RepoError, RepoResult};
use crate::digest::sha256_hex;
use crate::models::User;
use crate::store::{from_document, to_document, DocumentStore};
use crate::validate::{self, ValidationError};

pub struct AuthRepository {
    store: Arc<dyn DocumentStore>,
}

impl AuthRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Look up a credential by email and check the password digest.
    ///
    /// Returns `None` for an unknown email and for a wrong password alike;
    /// callers cannot tell the two cases apart.
    pub async fn login(&self, email: &str, plain_password: &str) -> RepoResult<Option<User>> {
        let found = self
            .store
            .query_eq(collections::USERS, "email", &json!(email), Some(1))
            .await?;
        let Some((_, doc)) = found.into_iter().next() else {
            return Ok(None);
        };
        let user: User = from_document(doc)?;

        if sha256_hex(plain_password) == user.password_digest {
            tracing::debug!(email, "login succeeded");
            Ok(Some(user))
        } else {
            tracing::debug!(email, "password mismatch");
            Ok(None)
        }
    }

    /// Create an administrator credential. Admin accounts are not linked to
    /// a nurse record.
    pub async fn register_admin(&self, email: &str, plain_password: &str) -> RepoResult<User> {
        if !validate::is_valid_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()).into());
        }

        let taken = self
            .store
            .query_eq(collections::USERS, "email", &json!(email), Some(1))
            .await?;
        if !taken.is_empty() {
            return Err(RepoError::DuplicateEmail(email.to_string()));
        }

        reserve_email(self.store.as_ref(), email).await?;

        let user = User::new_admin(email.to_string(), sha256_hex(plain_password));
        let doc = match to_document(&user) {
            Ok(doc) => doc,
            Err(err) => {
                self.undo_register(email).await;
                return Err(err.into());
            }
        };
        if let Err(err) = self.store.add(collections::USERS, doc).await {
            self.undo_register(email).await;
            return Err(err.into());
        }

        tracing::info!(email, "created admin credential");
        Ok(user)
    }

    async fn undo_register(&self, email: &str) {
        if let Err(err) = release_email(self.store.as_ref(), email).await {
            tracing::warn!("failed to release email claim: {err}");
        }
    }
}
