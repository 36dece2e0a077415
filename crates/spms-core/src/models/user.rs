//! Login credential model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Nurse,
}

/// A login credential. Nurse accounts carry a back-reference to the owning
/// nurse record; the nurse record itself does not point back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Lookup key for login; expected unique across credentials
    pub email: String,
    /// One-way hash of the password, never the plaintext
    pub password_digest: String,
    pub role: Role,
    /// Code of the owning nurse record, only for [`Role::Nurse`]
    pub nurse_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Credential for a nurse account, linked by code.
    pub fn new_nurse(email: String, password_digest: String, nurse_code: String) -> Self {
        Self {
            email,
            password_digest,
            role: Role::Nurse,
            nurse_code: Some(nurse_code),
            created_at: Utc::now(),
        }
    }

    /// Credential for an administrator account.
    pub fn new_admin(email: String, password_digest: String) -> Self {
        Self {
            email,
            password_digest,
            role: Role::Admin,
            nurse_code: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nurse_credential_links_code() {
        let user = User::new_nurse("a@x.com".into(), "digest".into(), "PRW001".into());
        assert_eq!(user.role, Role::Nurse);
        assert_eq!(user.nurse_code.as_deref(), Some("PRW001"));
    }

    #[test]
    fn test_admin_has_no_nurse_code() {
        let user = User::new_admin("admin@x.com".into(), "digest".into());
        assert_eq!(user.role, Role::Admin);
        assert!(user.nurse_code.is_none());
    }

    #[test]
    fn test_role_wire_form() {
        assert_eq!(
            serde_json::to_value(Role::Admin).unwrap(),
            serde_json::json!("ADMIN")
        );
        assert_eq!(
            serde_json::to_value(Role::Nurse).unwrap(),
            serde_json::json!("NURSE")
        );
    }
}
