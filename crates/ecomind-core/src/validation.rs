//! Validation utilities.

use crate::{EcoMindError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns an `EcoMindError` on failure.
    fn validate_request(&self) -> Result<(), EcoMindError> {
        self.validate().map_err(validation_errors_to_ecomind_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    // HashMap iteration order is unstable; keep messages deterministic.
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `EcoMindError`.
#[must_use]
pub fn validation_errors_to_ecomind_error(errors: ValidationErrors) -> EcoMindError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    EcoMindError::Validation(message)
}

/// Fails with `Validation` when `value` is empty or whitespace.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), EcoMindError> {
    if value.trim().is_empty() {
        return Err(EcoMindError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank").with_message("must not be blank".into()));
        }
        Ok(())
    }

    /// Validates a login: letters, digits, `_`, `-` and `.`, at most 64 chars.
    pub fn valid_login(login: &str) -> Result<(), ValidationError> {
        not_blank(login)?;
        if login.len() > crate::User::MAX_LOGIN_LENGTH {
            return Err(ValidationError::new("login_too_long"));
        }
        if !login
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(ValidationError::new("login_invalid_characters"));
        }
        Ok(())
    }

    /// Validates a phone number: optional leading `+`, then 3 to 20 digits.
    pub fn valid_phone_number(phone: &str) -> Result<(), ValidationError> {
        not_blank(phone)?;
        let digits = phone.strip_prefix('+').unwrap_or(phone);
        if digits.len() < 3 || digits.len() > 20 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("phone_number_invalid"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_valid_login() {
        assert!(valid_login("alice").is_ok());
        assert!(valid_login("google_g123").is_ok());
        assert!(valid_login("a.b-c").is_ok());
        assert!(valid_login("").is_err());
        assert!(valid_login("alice smith").is_err());
        assert!(valid_login("google:g123").is_err());
        assert!(valid_login(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_valid_phone_number() {
        assert!(valid_phone_number("+1000").is_ok());
        assert!(valid_phone_number("5551234").is_ok());
        assert!(valid_phone_number("").is_err());
        assert!(valid_phone_number("+1").is_err());
        assert!(valid_phone_number("555-1234").is_err());
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("login", "alice").is_ok());
        let err = require_non_blank("login", "  ").unwrap_err();
        assert!(err.to_string().contains("login is required"));
    }
}
