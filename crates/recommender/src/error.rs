use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use storefront_core::StorefrontError;

pub type Result<T> = std::result::Result<T, RecommenderError>;

#[derive(Debug, thiserror::Error)]
pub enum RecommenderError {
    /// Caller broke the query contract (bad limit, malformed id)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The feed source could not be read
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<StorefrontError> for RecommenderError {
    fn from(err: StorefrontError) -> Self {
        match err {
            StorefrontError::ValidationError { message, .. } => RecommenderError::Validation(message),
            StorefrontError::DatabaseError(message) => RecommenderError::DataSource(message),
            StorefrontError::ConfigurationError { message, .. } => RecommenderError::Config(message),
        }
    }
}

impl From<sqlx::Error> for RecommenderError {
    fn from(err: sqlx::Error) -> Self {
        RecommenderError::DataSource(err.to_string())
    }
}

impl From<config::ConfigError> for RecommenderError {
    fn from(err: config::ConfigError) -> Self {
        RecommenderError::Config(err.to_string())
    }
}

impl RecommenderError {
    fn error_code(&self) -> &'static str {
        match self {
            RecommenderError::Validation(_) => "validation_error",
            RecommenderError::DataSource(_) => "data_source_unavailable",
            RecommenderError::Config(_) => "configuration_error",
        }
    }
}

impl ResponseError for RecommenderError {
    fn status_code(&self) -> StatusCode {
        match self {
            RecommenderError::Validation(_) => StatusCode::BAD_REQUEST,
            RecommenderError::DataSource(_) => StatusCode::SERVICE_UNAVAILABLE,
            RecommenderError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.error_code(),
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: RecommenderError =
            StorefrontError::validation_field("limit must be positive", "limit").into();
        assert!(matches!(err, RecommenderError::Validation(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_error_maps_to_unavailable() {
        let err: RecommenderError = StorefrontError::database("connection refused").into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_config_error_maps_to_internal_server_error() {
        let err: RecommenderError = StorefrontError::ConfigurationError {
            message: "neighbor_cap must be positive".to_string(),
            key: Some("RECOMMENDER_NEIGHBOR_CAP".to_string()),
        }
        .into();
        assert!(matches!(err, RecommenderError::Config(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "configuration_error");
    }
}
