//! Nurse models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Gender;
use crate::validate::{self, ValidationError};

/// A nurse record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Nurse {
    /// Primary key, assigned once by the code allocator ("PRW" + sequence)
    pub code: String,
    /// Full name
    pub name: String,
    /// Professional registration number
    pub license_id: String,
    pub gender: Gender,
    pub phone: String,
    /// Login email; also stored on the linked credential record
    pub email: String,
    pub address: String,
    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,
}

/// Form input for a nurse, before a code has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NurseDraft {
    pub name: String,
    pub license_id: String,
    pub gender: Gender,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl NurseDraft {
    /// Check field contents before submitting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.license_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("licenseId"));
        }
        if !validate::is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        if !validate::is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    /// Finalize the draft into a record under the allocated code.
    pub fn into_record(self, code: String) -> Nurse {
        Nurse {
            code,
            name: self.name,
            license_id: self.license_id,
            gender: self.gender,
            phone: self.phone,
            email: self.email,
            address: self.address,
            created_at: Utc::now(),
        }
    }
}
