//! Validation utilities for Storefront request inputs
//!
//! Provides validation functions and regex patterns for the identifiers and
//! numeric ranges that cross the HTTP boundary.

use crate::error::StorefrontError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum accepted identifier length
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Opaque identifier pattern: letters, digits, `_`, `-`, `.`, `:`
pub static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.:\-]+$").expect("Failed to compile identifier regex")
});

/// Validate an opaque user or product identifier
///
/// # Examples
///
/// ```
/// use storefront_core::validation::validate_identifier;
///
/// assert!(validate_identifier("42", "product_id").is_ok());
/// assert!(validate_identifier("a1b2-c3", "user_id").is_ok());
/// assert!(validate_identifier("", "user_id").is_err());
/// assert!(validate_identifier("has space", "user_id").is_err());
/// ```
pub fn validate_identifier(id: &str, field: &str) -> Result<(), StorefrontError> {
    validate_string_length(id, field, Some(1), Some(MAX_IDENTIFIER_LEN))?;

    if IDENTIFIER_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(StorefrontError::validation_field(
            format!("Field '{}' contains unsupported characters", field),
            field,
        ))
    }
}

/// Validate a result-size limit is within `1..=max`
///
/// # Examples
///
/// ```
/// use storefront_core::validation::validate_limit;
///
/// assert!(validate_limit(10, 100).is_ok());
/// assert!(validate_limit(0, 100).is_err());
/// assert!(validate_limit(101, 100).is_err());
/// ```
pub fn validate_limit(limit: usize, max: usize) -> Result<(), StorefrontError> {
    if (1..=max).contains(&limit) {
        Ok(())
    } else {
        Err(StorefrontError::validation_field(
            format!("limit must be between 1 and {}, got {}", max, limit),
            "limit",
        ))
    }
}

/// Validate a product rating is within 0.0 to 5.0
///
/// # Examples
///
/// ```
/// use storefront_core::validation::validate_rating;
///
/// assert!(validate_rating(4.5).is_ok());
/// assert!(validate_rating(0.0).is_ok());
/// assert!(validate_rating(5.1).is_err());
/// assert!(validate_rating(f32::NAN).is_err());
/// ```
pub fn validate_rating(rating: f32) -> Result<(), StorefrontError> {
    if (0.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(StorefrontError::validation_field(
            format!("Rating must be between 0.0 and 5.0, got {}", rating),
            "rating",
        ))
    }
}

/// Validate string length is within bounds
pub fn validate_string_length(
    value: &str,
    field: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), StorefrontError> {
    let len = value.len();

    if let Some(min_len) = min {
        if len < min_len {
            return Err(StorefrontError::validation_field(
                format!(
                    "Field '{}' must be at least {} characters, got {}",
                    field, min_len, len
                ),
                field,
            ));
        }
    }

    if let Some(max_len) = max {
        if len > max_len {
            return Err(StorefrontError::validation_field(
                format!(
                    "Field '{}' must be at most {} characters, got {}",
                    field, max_len, len
                ),
                field,
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(validate_identifier("1", "product_id").is_ok());
        assert!(validate_identifier("user:42", "user_id").is_ok());
        assert!(validate_identifier("a.b_c-d", "user_id").is_ok());

        assert!(validate_identifier("", "user_id").is_err());
        assert!(validate_identifier("a/b", "user_id").is_err());
        assert!(validate_identifier(&"x".repeat(65), "user_id").is_err());
    }

    #[test]
    fn test_identifier_error_names_field() {
        match validate_identifier("", "product_id").unwrap_err() {
            StorefrontError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("product_id"));
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_limit_validation() {
        assert!(validate_limit(1, 100).is_ok());
        assert!(validate_limit(100, 100).is_ok());
        assert!(validate_limit(0, 100).is_err());
        assert!(validate_limit(500, 100).is_err());
    }

    #[test]
    fn test_rating_validation() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(-0.5).is_err());
    }
}
