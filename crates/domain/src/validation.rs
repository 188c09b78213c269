//! Input validation helpers.

use validator::ValidationError;

/// Maximum length of a stored phone number (matches the VARCHAR(16) column).
pub const MAX_PHONE_NUMBER_LEN: usize = 16;

/// Validates that a phone number is non-empty and fits the storage column.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        let mut err = ValidationError::new("phone_empty");
        err.message = Some("Phone number must not be empty".into());
        return Err(err);
    }
    if phone.chars().count() > MAX_PHONE_NUMBER_LEN {
        let mut err = ValidationError::new("phone_too_long");
        err.message = Some("Phone number must be at most 16 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("555-22-22").is_ok());
        assert!(validate_phone_number("1").is_ok());
        assert!(validate_phone_number("+7-999-555-22-22").is_ok()); // exactly 16
        assert!(validate_phone_number("").is_err());
        assert!(validate_phone_number("+7-999-555-22-223").is_err()); // 17
    }

    #[test]
    fn test_validate_phone_number_error_messages() {
        let err = validate_phone_number("").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Phone number must not be empty"
        );

        let err = validate_phone_number("01234567890123456789").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Phone number must be at most 16 characters"
        );
    }
}
