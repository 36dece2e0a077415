//! Gender value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Gender of a nurse or patient.
///
/// Serialized using the labels the record forms present, which is also how
/// existing documents store the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    #[serde(rename = "Laki-laki")]
    Male,
    #[serde(rename = "Perempuan")]
    Female,
}

impl Gender {
    /// The stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Laki-laki",
            Gender::Female => "Perempuan",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Laki-laki" => Ok(Gender::Male),
            "Perempuan" => Ok(Gender::Female),
            other => Err(ValidationError::InvalidGender(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for gender in [Gender::Male, Gender::Female] {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_serialized_form() {
        assert_eq!(
            serde_json::to_value(Gender::Female).unwrap(),
            serde_json::json!("Perempuan")
        );
    }
}
