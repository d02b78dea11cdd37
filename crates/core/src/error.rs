//! Shared error type for Storefront services
//!
//! Every crate in the workspace either returns `StorefrontError` directly or
//! converts it into its own error enum at the boundary.

use thiserror::Error;

/// Errors shared across Storefront crates
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable or config key at fault
        key: Option<String>,
    },

    /// Caller supplied a malformed value
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl StorefrontError {
    /// Validation error tied to a named input field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::DatabaseError(message.into())
    }

    /// HTTP status code a boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::DatabaseError(_) => 503,
            Self::ConfigurationError { .. } => 500,
        }
    }
}

impl From<sqlx::Error> for StorefrontError {
    fn from(err: sqlx::Error) -> Self {
        StorefrontError::DatabaseError(err.to_string())
    }
}
