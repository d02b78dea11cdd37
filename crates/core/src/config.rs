//! Shared configuration loader for Storefront services
//!
//! Configuration is read from environment variables with the `STOREFRONT_`
//! prefix, falling back to the conventional unprefixed names
//! (`DATABASE_URL`, `HOST`, `PORT`, `RUST_LOG`). A `.env` file is honoured
//! when [`load_dotenv`] is called first.
//!
//! Override order: defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use storefront_core::config::{load_dotenv, ConfigLoader, DatabaseConfig, ServiceConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! load_dotenv();
//!
//! let db_config = DatabaseConfig::from_env()?;
//! let service_config = ServiceConfig::from_env()?;
//!
//! db_config.validate()?;
//! service_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::StorefrontError;
use std::time::Duration;
use url::Url;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a required variable is missing or a
    /// value cannot be parsed.
    fn from_env() -> Result<Self, StorefrontError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` naming the offending key.
    fn validate(&self) -> Result<(), StorefrontError>;
}

/// Database configuration
///
/// # Environment Variables
///
/// - `STOREFRONT_DATABASE_URL` (required, falls back to `DATABASE_URL`)
/// - `STOREFRONT_DATABASE_MAX_CONNECTIONS` (default: 10)
/// - `STOREFRONT_DATABASE_MIN_CONNECTIONS` (default: 1)
/// - `STOREFRONT_DATABASE_CONNECT_TIMEOUT` seconds (default: 30)
/// - `STOREFRONT_DATABASE_IDLE_TIMEOUT` seconds (default: 600)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/storefront".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, StorefrontError> {
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| StorefrontError::ConfigurationError {
                message: "DATABASE_URL or STOREFRONT_DATABASE_URL must be set".to_string(),
                key: Some("STOREFRONT_DATABASE_URL".to_string()),
            })?;

        let defaults = DatabaseConfig::default();

        let max_connections =
            parse_env_var("STOREFRONT_DATABASE_MAX_CONNECTIONS", defaults.max_connections)?;
        let min_connections =
            parse_env_var("STOREFRONT_DATABASE_MIN_CONNECTIONS", defaults.min_connections)?;
        let connect_timeout_secs = parse_env_var("STOREFRONT_DATABASE_CONNECT_TIMEOUT", 30u64)?;
        let idle_timeout_secs = parse_env_var("STOREFRONT_DATABASE_IDLE_TIMEOUT", 600u64)?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    fn validate(&self) -> Result<(), StorefrontError> {
        Url::parse(&self.url).map_err(|e| StorefrontError::ConfigurationError {
            message: format!("Invalid DATABASE_URL: {}", e),
            key: Some("STOREFRONT_DATABASE_URL".to_string()),
        })?;

        if self.max_connections == 0 {
            return Err(StorefrontError::ConfigurationError {
                message: "max_connections must be greater than 0".to_string(),
                key: Some("STOREFRONT_DATABASE_MAX_CONNECTIONS".to_string()),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(StorefrontError::ConfigurationError {
                message: format!(
                    "min_connections ({}) cannot exceed max_connections ({})",
                    self.min_connections, self.max_connections
                ),
                key: Some("STOREFRONT_DATABASE_MIN_CONNECTIONS".to_string()),
            });
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(StorefrontError::ConfigurationError {
                message: "connect_timeout must be greater than 0 seconds".to_string(),
                key: Some("STOREFRONT_DATABASE_CONNECT_TIMEOUT".to_string()),
            });
        }

        Ok(())
    }
}

/// HTTP service configuration
///
/// # Environment Variables
///
/// - `STOREFRONT_SERVICE_HOST` (falls back to `HOST`, default "0.0.0.0")
/// - `STOREFRONT_SERVICE_PORT` (falls back to `PORT`, default 8083)
/// - `STOREFRONT_SERVICE_WORKERS` (default: CPU count)
/// - `STOREFRONT_SERVICE_LOG_LEVEL` (falls back to `RUST_LOG`, default "info")
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            workers: num_cpus::get(),
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ConfigLoader for ServiceConfig {
    fn from_env() -> Result<Self, StorefrontError> {
        let defaults = ServiceConfig::default();

        let host = std::env::var("STOREFRONT_SERVICE_HOST")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or(defaults.host);

        let port = match std::env::var("STOREFRONT_SERVICE_PORT") {
            Ok(_) => parse_env_var("STOREFRONT_SERVICE_PORT", defaults.port)?,
            Err(_) => parse_env_var("PORT", defaults.port)?,
        };

        let workers = parse_env_var("STOREFRONT_SERVICE_WORKERS", defaults.workers)?;

        let log_level = std::env::var("STOREFRONT_SERVICE_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        Ok(Self {
            host,
            port,
            workers,
            log_level,
        })
    }

    fn validate(&self) -> Result<(), StorefrontError> {
        if self.port == 0 {
            return Err(StorefrontError::ConfigurationError {
                message: "port must be greater than 0".to_string(),
                key: Some("STOREFRONT_SERVICE_PORT".to_string()),
            });
        }

        if self.workers == 0 {
            return Err(StorefrontError::ConfigurationError {
                message: "workers must be greater than 0".to_string(),
                key: Some("STOREFRONT_SERVICE_WORKERS".to_string()),
            });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(StorefrontError::ConfigurationError {
                message: format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    valid_log_levels.join(", ")
                ),
                key: Some("STOREFRONT_SERVICE_LOG_LEVEL".to_string()),
            });
        }

        Ok(())
    }
}

/// Parse an environment variable, returning `default` when it is unset
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is set but cannot be parsed.
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, StorefrontError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| StorefrontError::ConfigurationError {
                    message: format!("Failed to parse {}: {}", key, e),
                    key: Some(key.to_string()),
                })
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Missing files are ignored; other failures are reported on stderr because
/// logging is usually not initialised yet.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests in this module share process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_test_env(key: &str, value: &str) {
        env::set_var(key, value);
    }

    fn clear_test_env(key: &str) {
        env::remove_var(key);
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_test_env("STOREFRONT_DATABASE_URL", "postgresql://localhost/test");
        set_test_env("STOREFRONT_DATABASE_MAX_CONNECTIONS", "50");
        set_test_env("STOREFRONT_DATABASE_MIN_CONNECTIONS", "5");

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.url, "postgresql://localhost/test");
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.min_connections, 5);

        clear_test_env("STOREFRONT_DATABASE_URL");
        clear_test_env("STOREFRONT_DATABASE_MAX_CONNECTIONS");
        clear_test_env("STOREFRONT_DATABASE_MIN_CONNECTIONS");
    }

    #[test]
    fn test_database_url_fallback() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_test_env("STOREFRONT_DATABASE_URL");
        set_test_env("DATABASE_URL", "postgresql://fallback/test");

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.url, "postgresql://fallback/test");

        clear_test_env("DATABASE_URL");
    }

    #[test]
    fn test_database_config_validation_invalid_url() {
        let mut config = DatabaseConfig::default();
        config.url = "not a url".to_string();

        let result = config.validate();
        assert!(matches!(
            result.unwrap_err(),
            StorefrontError::ConfigurationError { .. }
        ));
    }

    #[test]
    fn test_database_config_validation_min_exceeds_max() {
        let mut config = DatabaseConfig::default();
        config.min_connections = 20;
        config.max_connections = 5;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8083);
        assert_eq!(config.bind_addr(), "0.0.0.0:8083");
        assert!(config.workers > 0);
    }

    #[test]
    fn test_service_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_test_env("STOREFRONT_SERVICE_HOST", "127.0.0.1");
        set_test_env("STOREFRONT_SERVICE_PORT", "3000");
        set_test_env("STOREFRONT_SERVICE_WORKERS", "4");
        set_test_env("STOREFRONT_SERVICE_LOG_LEVEL", "debug");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.log_level, "debug");

        clear_test_env("STOREFRONT_SERVICE_HOST");
        clear_test_env("STOREFRONT_SERVICE_PORT");
        clear_test_env("STOREFRONT_SERVICE_WORKERS");
        clear_test_env("STOREFRONT_SERVICE_LOG_LEVEL");
    }

    #[test]
    fn test_service_port_fallback() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_test_env("STOREFRONT_SERVICE_PORT");
        set_test_env("PORT", "9000");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.port, 9000);

        clear_test_env("PORT");
    }

    #[test]
    fn test_service_config_validation_invalid_log_level() {
        let mut config = ServiceConfig::default();
        config.log_level = "loud".to_string();

        match config.validate().unwrap_err() {
            StorefrontError::ConfigurationError { message, .. } => {
                assert!(message.contains("Invalid log_level"));
            }
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_service_config_validation_zero_port() {
        let mut config = ServiceConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_var_with_default() {
        let result: u32 = parse_env_var("STOREFRONT_NON_EXISTENT_VAR", 42).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_env_var_invalid_value() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_test_env("STOREFRONT_TEST_INVALID_VAR", "not-a-number");
        let result: Result<u32, _> = parse_env_var("STOREFRONT_TEST_INVALID_VAR", 42);
        assert!(result.is_err());
        clear_test_env("STOREFRONT_TEST_INVALID_VAR");
    }
}
