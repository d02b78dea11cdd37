//! Records exchanged with the feed sources and the HTTP layer

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Opaque product key. Integer keys are carried as their decimal text.
pub type ProductId = String;

/// Opaque user key
pub type UserId = String;

/// Ascending product id order: numeric when both ids are decimal integers,
/// textual otherwise
pub fn compare_product_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// One product row from the catalog feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    /// 0.0 to 5.0
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub stock: u32,
}

impl ProductRecord {
    /// Text used for content similarity: category then description
    pub fn content_text(&self) -> String {
        format!(
            "{} {}",
            self.category,
            self.description.as_deref().unwrap_or("")
        )
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            rating: self.rating,
            stock: self.stock,
        }
    }
}

/// One (user, product) row of the interaction feed
///
/// Feeds may deliver raw events with `count == 1` or rows already aggregated
/// by the source; the matrix builder sums either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: UserId,
    pub product_id: ProductId,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl InteractionRecord {
    pub fn new(user_id: impl Into<UserId>, product_id: impl Into<ProductId>, count: u32) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
            count,
        }
    }

    /// A single purchase event
    pub fn event(user_id: impl Into<UserId>, product_id: impl Into<ProductId>) -> Self {
        Self::new(user_id, product_id, 1)
    }
}

/// Product projection returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub rating: f32,
    pub stock: u32,
}

/// Which model produced a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Collaborative,
    ContentBased,
    Popularity,
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecommendationSource::Collaborative => "collaborative",
            RecommendationSource::ContentBased => "content_based",
            RecommendationSource::Popularity => "popularity",
        };
        f.write_str(name)
    }
}

/// Ranked recommendation list
///
/// Never longer than the requested limit and never contains duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(rename = "recommendations")]
    pub items: Vec<ProductSummary>,
    pub source: RecommendationSource,
}

impl Recommendations {
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Why a model could not answer a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Derived state has not been built
    Untrained,
    /// The user has no interaction history
    UnknownUser,
    /// The seed product is not in the catalog snapshot
    UnknownProduct,
    /// The model ran but no candidate cleared the filters
    NoCandidates,
}

/// Result of asking a single model for a ranking
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Ranked(Vec<ProductId>),
    Unavailable(UnavailableReason),
}
