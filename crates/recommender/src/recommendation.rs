//! Hybrid Recommendation Engine
//!
//! Owns the derived models and answers the public queries. Each query asks a
//! single model for a ranking and falls back to the popularity ranker when
//! that model is unavailable:
//!
//! | query                   | model          | fallback excludes |
//! |-------------------------|----------------|-------------------|
//! | `recommend_for_user`    | collaborative  | the user's owned products |
//! | `recommend_for_product` | content-based  | the seed product  |
//! | `recommend_popular`     | popularity     | nothing           |
//!
//! Training builds a complete [`TrainedModels`] off to the side and publishes
//! it with a single pointer swap, so readers only ever observe the previous
//! models or the new ones.

use crate::catalog::CatalogIndex;
use crate::collaborative::{ItemSimilarityModel, NeighborParams};
use crate::config::EngineConfig;
use crate::content_based::ContentModel;
use crate::error::{RecommenderError, Result};
use crate::interaction::InteractionMatrix;
use crate::popularity::PopularityRanker;
use crate::source::FeedSource;
use crate::types::{
    InteractionRecord, ModelOutcome, ProductId, ProductRecord, ProductSummary, RecommendationSource,
    Recommendations, UnavailableReason,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use storefront_core::validation::{validate_identifier, validate_limit};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Why a training pass produced no models
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainingError {
    #[error("catalog feed is empty")]
    EmptyCatalog,

    #[error("interaction feed has no usable rows")]
    EmptyInteractions,

    #[error("catalog text reduces to an empty vocabulary")]
    EmptyVocabulary,

    #[error("feed source failed: {0}")]
    Source(String),
}

/// Every structure derived by one training pass
#[derive(Debug, Clone)]
pub struct TrainedModels {
    catalog: CatalogIndex,
    interactions: InteractionMatrix,
    collaborative: ItemSimilarityModel,
    content: ContentModel,
    popularity: PopularityRanker,
    trained_at: DateTime<Utc>,
}

/// Catalog and interaction structures read by one training pass
struct FeedIndex {
    catalog: CatalogIndex,
    interactions: InteractionMatrix,
}

impl FeedIndex {
    fn new(catalog: CatalogIndex, interaction_rows: &[InteractionRecord]) -> Self {
        let interactions = InteractionMatrix::build(interaction_rows, &catalog);
        Self {
            catalog,
            interactions,
        }
    }

    fn popular(&self, limit: usize, exclusion: Exclusion<'_>) -> Recommendations {
        let ranker = PopularityRanker::build(&self.catalog, &self.interactions);
        rank_popular(&self.catalog, &self.interactions, &ranker, limit, exclusion)
    }
}

impl TrainedModels {
    /// Run the pipeline: catalog, interactions, collaborative, content
    ///
    /// The first step that yields an empty structure stops the pipeline.
    pub fn build(
        catalog_rows: Vec<ProductRecord>,
        interaction_rows: &[InteractionRecord],
        max_features: usize,
    ) -> std::result::Result<Self, TrainingError> {
        let catalog = CatalogIndex::load(catalog_rows).ok_or(TrainingError::EmptyCatalog)?;
        Self::from_index(FeedIndex::new(catalog, interaction_rows), max_features)
            .map_err(|(err, _)| err)
    }

    /// Remaining pipeline steps; a failed step hands the index back
    fn from_index(
        index: FeedIndex,
        max_features: usize,
    ) -> std::result::Result<Self, (TrainingError, FeedIndex)> {
        let Some(collaborative) = ItemSimilarityModel::build(&index.interactions) else {
            return Err((TrainingError::EmptyInteractions, index));
        };
        let Some(content) = ContentModel::build(&index.catalog, max_features) else {
            return Err((TrainingError::EmptyVocabulary, index));
        };

        let FeedIndex {
            catalog,
            interactions,
        } = index;
        let popularity = PopularityRanker::build(&catalog, &interactions);

        Ok(Self {
            catalog,
            interactions,
            collaborative,
            content,
            popularity,
            trained_at: Utc::now(),
        })
    }

    fn popular(&self, limit: usize, exclusion: Exclusion<'_>) -> Recommendations {
        rank_popular(
            &self.catalog,
            &self.interactions,
            &self.popularity,
            limit,
            exclusion,
        )
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn interactions(&self) -> &InteractionMatrix {
        &self.interactions
    }

    pub fn collaborative(&self) -> &ItemSimilarityModel {
        &self.collaborative
    }

    pub fn content(&self) -> &ContentModel {
        &self.content
    }

    pub fn popularity(&self) -> &PopularityRanker {
        &self.popularity
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

/// Snapshot of the engine state, reported on the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub trained: bool,
    pub trained_at: Option<DateTime<Utc>>,
    pub products: usize,
    pub users: usize,
    pub vocabulary: usize,
}

/// Products a fallback list must leave out
enum Exclusion<'a> {
    Nothing,
    OwnedBy(&'a str),
    Seed(&'a str),
}

impl Exclusion<'_> {
    fn resolve(&self, interactions: &InteractionMatrix) -> HashSet<ProductId> {
        match self {
            Exclusion::Nothing => HashSet::new(),
            Exclusion::OwnedBy(user_id) => interactions.owned_products(user_id).into_iter().collect(),
            Exclusion::Seed(product_id) => [product_id.to_string()].into_iter().collect(),
        }
    }
}

fn project(catalog: &CatalogIndex, ids: &[ProductId]) -> Vec<ProductSummary> {
    ids.iter()
        .filter_map(|id| catalog.get(id).map(ProductRecord::summary))
        .collect()
}

fn rank_popular(
    catalog: &CatalogIndex,
    interactions: &InteractionMatrix,
    ranker: &PopularityRanker,
    limit: usize,
    exclusion: Exclusion<'_>,
) -> Recommendations {
    let excluded = exclusion.resolve(interactions);
    let ids = ranker.top_excluding(limit, &excluded);
    Recommendations {
        items: project(catalog, &ids),
        source: RecommendationSource::Popularity,
    }
}

/// What a query observes once the lazy training check is done
enum Snapshot {
    Trained(Arc<TrainedModels>),
    /// Training stopped after the feeds were read; `None` for an empty catalog
    Untrained(Option<FeedIndex>),
    /// The feeds could not be read
    Unreadable(RecommenderError),
}

impl Snapshot {
    /// Popularity ranking from whatever this snapshot holds, without reading
    /// the feeds again
    fn popular(self, limit: usize, exclusion: Exclusion<'_>) -> Result<Recommendations> {
        match self {
            Snapshot::Trained(models) => Ok(models.popular(limit, exclusion)),
            Snapshot::Untrained(Some(index)) => Ok(index.popular(limit, exclusion)),
            Snapshot::Untrained(None) => Ok(Recommendations {
                items: Vec::new(),
                source: RecommendationSource::Popularity,
            }),
            Snapshot::Unreadable(err) => Err(err),
        }
    }
}

/// Recommendation engine with an UNTRAINED/TRAINED lifecycle
///
/// Queries train lazily when no models are published. A failed training pass
/// leaves the engine UNTRAINED and every query is answered by popularity.
pub struct RecommendationEngine {
    source: Arc<dyn FeedSource>,
    config: EngineConfig,
    state: RwLock<Option<Arc<TrainedModels>>>,
    train_lock: Mutex<()>,
}

impl RecommendationEngine {
    pub fn new(source: Arc<dyn FeedSource>, config: EngineConfig) -> Self {
        Self {
            source,
            config,
            state: RwLock::new(None),
            train_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.state.read().is_some()
    }

    /// Currently published models, if any
    pub fn models(&self) -> Option<Arc<TrainedModels>> {
        self.state.read().clone()
    }

    pub fn status(&self) -> EngineStatus {
        match self.models() {
            Some(models) => EngineStatus {
                trained: true,
                trained_at: Some(models.trained_at),
                products: models.catalog.len(),
                users: models.interactions.num_users(),
                vocabulary: models.content.dimension(),
            },
            None => EngineStatus {
                trained: false,
                trained_at: None,
                products: 0,
                users: 0,
                vocabulary: 0,
            },
        }
    }

    /// Rebuild every model from fresh feeds
    ///
    /// Concurrent calls are serialized. Returns whether the engine is TRAINED
    /// afterwards.
    pub async fn train(&self) -> bool {
        let _guard = self.train_lock.lock().await;
        matches!(self.train_locked().await, Snapshot::Trained(_))
    }

    async fn train_locked(&self) -> Snapshot {
        let started = Instant::now();

        let outcome = match self.read_feeds().await {
            Ok(Some(index)) => TrainedModels::from_index(index, self.config.max_features)
                .map_err(|(err, index)| (err, Snapshot::Untrained(Some(index)))),
            Ok(None) => Err((TrainingError::EmptyCatalog, Snapshot::Untrained(None))),
            Err(e) => Err((TrainingError::Source(e.to_string()), Snapshot::Unreadable(e))),
        };

        match outcome {
            Ok(models) => {
                info!(
                    products = models.catalog.len(),
                    users = models.interactions.num_users(),
                    items = models.collaborative.num_items(),
                    vocabulary = models.content.dimension(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Recommendation models trained"
                );
                let models = Arc::new(models);
                *self.state.write() = Some(models.clone());
                Snapshot::Trained(models)
            }
            Err((e, snapshot)) => {
                warn!(
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Training failed, serving popularity fallback"
                );
                *self.state.write() = None;
                snapshot
            }
        }
    }

    /// One read of both feeds; `None` when the catalog is empty
    async fn read_feeds(&self) -> Result<Option<FeedIndex>> {
        let catalog_rows = self.source.fetch_catalog().await?;
        let Some(catalog) = CatalogIndex::load(catalog_rows) else {
            return Ok(None);
        };
        let interaction_rows = self.source.fetch_interactions().await?;
        Ok(Some(FeedIndex::new(catalog, &interaction_rows)))
    }

    /// Published models, training first if there are none
    async fn ensure_trained(&self) -> Snapshot {
        if let Some(models) = self.models() {
            return Snapshot::Trained(models);
        }

        let _guard = self.train_lock.lock().await;
        // Another request may have trained while we waited
        if let Some(models) = self.models() {
            return Snapshot::Trained(models);
        }
        self.train_locked().await
    }

    fn neighbor_params(&self) -> NeighborParams {
        NeighborParams {
            neighbor_cap: self.config.neighbor_cap,
            similarity_threshold: self.config.similarity_threshold,
        }
    }

    fn check_limit(&self, limit: usize) -> Result<()> {
        validate_limit(limit, self.config.max_limit)?;
        Ok(())
    }

    /// Products for a user, by what similar shoppers bought
    #[instrument(skip(self))]
    pub async fn recommend_for_user(&self, user_id: &str, limit: usize) -> Result<Recommendations> {
        validate_identifier(user_id, "user_id")?;
        self.check_limit(limit)?;

        let models = match self.ensure_trained().await {
            Snapshot::Trained(models) => models,
            untrained => {
                debug!(reason = ?UnavailableReason::Untrained, "Collaborative model unavailable, falling back to popularity");
                return untrained.popular(limit, Exclusion::OwnedBy(user_id));
            }
        };

        match models.collaborative.recommend_for_user(
            &models.interactions,
            user_id,
            limit,
            self.neighbor_params(),
        ) {
            ModelOutcome::Ranked(ids) => Ok(Recommendations {
                items: project(&models.catalog, &ids),
                source: RecommendationSource::Collaborative,
            }),
            ModelOutcome::Unavailable(reason) => {
                debug!(?reason, "Collaborative model unavailable, falling back to popularity");
                Ok(models.popular(limit, Exclusion::OwnedBy(user_id)))
            }
        }
    }

    /// Products similar in content to `product_id`, never including it
    #[instrument(skip(self))]
    pub async fn recommend_for_product(
        &self,
        product_id: &str,
        limit: usize,
    ) -> Result<Recommendations> {
        validate_identifier(product_id, "product_id")?;
        self.check_limit(limit)?;

        let models = match self.ensure_trained().await {
            Snapshot::Trained(models) => models,
            untrained => {
                debug!(reason = ?UnavailableReason::Untrained, "Content model unavailable, falling back to popularity");
                return untrained.popular(limit, Exclusion::Seed(product_id));
            }
        };

        match models.content.similar_to(&models.catalog, product_id, limit) {
            ModelOutcome::Ranked(ids) => Ok(Recommendations {
                items: project(&models.catalog, &ids),
                source: RecommendationSource::ContentBased,
            }),
            ModelOutcome::Unavailable(reason) => {
                debug!(?reason, "Content model unavailable, falling back to popularity");
                Ok(models.popular(limit, Exclusion::Seed(product_id)))
            }
        }
    }

    /// Most popular products, for callers without a user or product context
    #[instrument(skip(self))]
    pub async fn recommend_popular(&self, limit: usize) -> Result<Recommendations> {
        self.check_limit(limit)?;
        self.ensure_trained()
            .await
            .popular(limit, Exclusion::Nothing)
    }
}
