//! Storefront Recommendation Engine
//!
//! Hybrid product recommender for the storefront: item-item collaborative
//! filtering over purchase history, TF-IDF content similarity over the
//! catalog, and a popularity ranking that answers whenever either model
//! cannot.

pub mod catalog;
pub mod collaborative;
pub mod config;
pub mod content_based;
pub mod error;
pub mod interaction;
pub mod popularity;
pub mod recommendation;
pub mod server;
pub mod source;
pub mod types;

// Re-export key types
pub use catalog::CatalogIndex;
pub use collaborative::{ItemSimilarityModel, NeighborParams};
pub use config::{
    EngineConfig, DEFAULT_MAX_FEATURES, DEFAULT_NEIGHBOR_CAP, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use content_based::ContentModel;
pub use error::{RecommenderError, Result};
pub use interaction::InteractionMatrix;
pub use popularity::PopularityRanker;
pub use recommendation::{EngineStatus, RecommendationEngine, TrainedModels, TrainingError};
pub use source::{FeedSource, InMemoryFeedSource, PostgresFeedSource};
pub use types::*;

#[cfg(test)]
mod tests;
