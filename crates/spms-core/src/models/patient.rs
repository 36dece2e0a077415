//! Patient models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Gender;
use crate::validate::{self, ValidationError};

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Primary key, assigned once by the code allocator ("PSN" + sequence)
    pub code: String,
    pub name: String,
    /// National identity number, 16 digits
    pub national_id: String,
    pub gender: Gender,
    pub phone: String,
    /// Responsible guardian or family member
    pub guardian_name: String,
    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,
}

/// Form input for a patient, before a code has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    pub name: String,
    pub national_id: String,
    pub gender: Gender,
    pub phone: String,
    pub guardian_name: String,
}

impl PatientDraft {
    /// Check field contents before submitting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if !validate::is_valid_national_id(&self.national_id) {
            return Err(ValidationError::InvalidNationalId(self.national_id.clone()));
        }
        if !validate::is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        Ok(())
    }

    /// Finalize the draft into a record under the allocated code.
    pub fn into_record(self, code: String) -> Patient {
        Patient {
            code,
            name: self.name,
            national_id: self.national_id,
            gender: self.gender,
            phone: self.phone,
            guardian_name: self.guardian_name,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PatientDraft {
        PatientDraft {
            name: "Budi".into(),
            national_id: "3201234567890001".into(),
            gender: Gender::Male,
            phone: "0812345678".into(),
            guardian_name: "Andi".into(),
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_national_id() {
        let mut d = draft();
        d.national_id = "12345".into();
        assert!(matches!(
            d.validate(),
            Err(ValidationError::InvalidNationalId(_))
        ));
    }

    #[test]
    fn test_into_record_keeps_fields() {
        let patient = draft().into_record("PSN007".into());
        assert_eq!(patient.code, "PSN007");
        assert_eq!(patient.national_id, "3201234567890001");
    }
}
