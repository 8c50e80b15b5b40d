//! Payload validation shared by the entity handlers. Field constraints mirror
//! the column definitions; anything that fails here never reaches the store.

use std::collections::HashMap;

use crate::error::ApiError;

pub const TITLE_MAX: usize = 200;
pub const SLUG_MAX: usize = 150;
pub const CATEGORY_NAME_MAX: usize = 80;
pub const CATEGORY_DESCRIPTION_MAX: usize = 100;
pub const USERNAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 320;

pub type FieldErrors = HashMap<String, String>;

pub fn require_non_empty(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "This field is required".to_string());
    }
}

pub fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.insert(
            field.to_string(),
            format!("Must be at most {} characters", max),
        );
    }
}

pub fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    // Shape check only; deliverability is not our problem
    if !value.contains('@') || value.starts_with('@') || value.ends_with('@') {
        errors.insert(field.to_string(), "Invalid email address".to_string());
    }
}

pub fn ensure_valid(errors: FieldErrors) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(
            "Invalid field values",
            Some(errors),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_required_error() {
        let mut errors = FieldErrors::new();
        require_non_empty(&mut errors, "title", "   ");
        assert!(errors.contains_key("title"));
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        check_max_len(&mut errors, "name", &"é".repeat(80), CATEGORY_NAME_MAX);
        assert!(errors.is_empty());
        check_max_len(&mut errors, "name", &"é".repeat(81), CATEGORY_NAME_MAX);
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn email_shape_check() {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", "alice@example.com");
        assert!(errors.is_empty());
        check_email(&mut errors, "email", "alice");
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn ensure_valid_maps_to_validation_error() {
        let mut errors = FieldErrors::new();
        errors.insert("slug".to_string(), "too long".to_string());
        let err = ensure_valid(errors).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
