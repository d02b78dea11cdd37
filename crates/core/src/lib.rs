//! # Storefront Core
//!
//! Shared building blocks for the Storefront services.
//!
//! ## Modules
//!
//! - `error`: Shared error type
//! - `config`: Environment configuration loading and validation
//! - `database`: Shared PostgreSQL connection pool
//! - `math`: Vector operations used by the similarity models
//! - `observability`: Structured logging initialisation
//! - `validation`: Request input validation

pub mod config;
pub mod database;
pub mod error;
pub mod math;
pub mod observability;
pub mod validation;

pub use config::{load_dotenv, parse_env_var, ConfigLoader, DatabaseConfig, ServiceConfig};
pub use database::DatabasePool;
pub use error::StorefrontError;
pub use math::{cosine_similarity, dot_product, l2_norm, normalize_vector};
pub use observability::{init_logging, LogConfig, LogFormat, ObservabilityError};
pub use validation::{validate_identifier, validate_limit, validate_rating};

/// Result type alias for Storefront operations
pub type Result<T> = std::result::Result<T, StorefrontError>;
