use crate::error::{RecommenderError, Result};
use serde::{Deserialize, Serialize};

/// Candidates at or below this similarity are treated as noise
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.1;

/// Neighbors considered per owned item
pub const DEFAULT_NEIGHBOR_CAP: usize = 20;

/// Vocabulary size of the content vector space
pub const DEFAULT_MAX_FEATURES: usize = 100;

/// Recommendation engine configuration
///
/// Loaded from `config/recommender.{toml,yaml,json}` when present, then
/// overridden by `RECOMMENDER_*` environment variables
/// (e.g. `RECOMMENDER_NEIGHBOR_CAP=30`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Most-similar neighbors taken per owned item (default: 20)
    pub neighbor_cap: usize,

    /// Minimum collaborative similarity, exclusive (default: 0.1)
    pub similarity_threshold: f32,

    /// Content vocabulary cap (default: 100)
    pub max_features: usize,

    /// Default limit for per-user queries (default: 10)
    pub default_user_limit: usize,

    /// Default limit for per-product queries (default: 6)
    pub default_product_limit: usize,

    /// Default limit for the popular list (default: 10)
    pub default_popular_limit: usize,

    /// Largest limit a caller may request (default: 100)
    pub max_limit: usize,

    /// Train before accepting requests instead of on first query
    pub train_on_startup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbor_cap: DEFAULT_NEIGHBOR_CAP,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_features: DEFAULT_MAX_FEATURES,
            default_user_limit: 10,
            default_product_limit: 6,
            default_popular_limit: 10,
            max_limit: 100,
            train_on_startup: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/recommender").required(false))
            .add_source(config::Environment::with_prefix("RECOMMENDER"))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.neighbor_cap == 0 {
            return Err(RecommenderError::Config(
                "neighbor_cap must be greater than 0".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.similarity_threshold) {
            return Err(RecommenderError::Config(format!(
                "similarity_threshold must be in [0, 1), got {}",
                self.similarity_threshold
            )));
        }

        if self.max_features == 0 {
            return Err(RecommenderError::Config(
                "max_features must be greater than 0".to_string(),
            ));
        }

        if self.max_limit == 0 {
            return Err(RecommenderError::Config(
                "max_limit must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("default_user_limit", self.default_user_limit),
            ("default_product_limit", self.default_product_limit),
            ("default_popular_limit", self.default_popular_limit),
        ] {
            if value == 0 || value > self.max_limit {
                return Err(RecommenderError::Config(format!(
                    "{} must be between 1 and max_limit ({}), got {}",
                    name, self.max_limit, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.neighbor_cap, 20);
        assert_eq!(config.similarity_threshold, 0.1);
        assert_eq!(config.max_features, 100);
        assert_eq!(config.default_user_limit, 10);
        assert_eq!(config.default_product_limit, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let config = EngineConfig {
            similarity_threshold: 1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(RecommenderError::Config(_))));
    }

    #[test]
    fn test_rejects_default_limit_above_max() {
        let config = EngineConfig {
            default_user_limit: 500,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"neighbor_cap": 30, "train_on_startup": true}"#).unwrap();
        assert_eq!(config.neighbor_cap, 30);
        assert!(config.train_on_startup);
        assert_eq!(config.max_features, 100);
    }
}
