//! Field validators for form input.

use thiserror::Error;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid national id: {0}")]
    InvalidNationalId(String),

    #[error("invalid gender: {0}")]
    InvalidGender(String),
}

/// Local mobile number: "08" prefix, 10 to 13 digits, nothing else.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.starts_with("08")
        && (10..=13).contains(&phone.len())
        && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    labels.clone().count() >= 2 && labels.all(|label| !label.is_empty())
}

/// National identity number: exactly 16 digits.
pub fn is_valid_national_id(id: &str) -> bool {
    id.len() == 16 && id.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_phone_vectors() {
        assert!(is_valid_phone("081234567890"));
        assert!(is_valid_phone("0812345678"));
        assert!(is_valid_phone("0812345678901"));

        assert!(!is_valid_phone("1234567890")); // no 08 prefix
        assert!(!is_valid_phone("081234")); // too short
        assert!(!is_valid_phone("08123456789012")); // too long
        assert!(!is_valid_phone("08123abc90"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_email_vectors() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));

        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@xcom"));
        assert!(!is_valid_email("a@x..com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@@x.com"));
    }

    #[test]
    fn test_national_id_vectors() {
        assert!(is_valid_national_id("3201234567890001"));
        assert!(!is_valid_national_id("320123456789000")); // 15 digits
        assert!(!is_valid_national_id("32012345678900011")); // 17 digits
        assert!(!is_valid_national_id("320123456789000a"));
    }

    proptest! {
        #[test]
        fn prop_sixteen_digits_always_valid(id in "[0-9]{16}") {
            prop_assert!(is_valid_national_id(&id));
        }

        #[test]
        fn prop_short_ids_never_valid(id in "[0-9]{0,15}") {
            prop_assert!(!is_valid_national_id(&id));
        }

        #[test]
        fn prop_phone_length_bounds(digits in "[0-9]{8,12}") {
            let phone = format!("08{digits}");
            prop_assert_eq!(is_valid_phone(&phone), phone.len() <= 13);
        }
    }
}
