//! Popularity ranking
//!
//! Context-free terminal fallback: the whole catalog ordered by rating, then
//! by how often each product was purchased. Products never purchased take
//! part with a count of zero.

use crate::catalog::CatalogIndex;
use crate::interaction::InteractionMatrix;
use crate::types::ProductId;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct PopularityRanker {
    /// Product ids, most popular first
    ranking: Vec<ProductId>,
}

impl PopularityRanker {
    /// Rank the catalog: rating desc, purchase count desc, catalog order
    pub fn build(catalog: &CatalogIndex, interactions: &InteractionMatrix) -> Self {
        let mut scored: Vec<(usize, f32, u64)> = catalog
            .products()
            .iter()
            .enumerate()
            .map(|(pos, product)| (pos, product.rating, interactions.product_count(&product.id)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.2.cmp(&a.2)));

        Self {
            ranking: scored
                .into_iter()
                .filter_map(|(pos, _, _)| catalog.at(pos).map(|p| p.id.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    /// Top `limit` product ids
    pub fn top(&self, limit: usize) -> Vec<ProductId> {
        self.ranking.iter().take(limit).cloned().collect()
    }

    /// Top `limit` product ids, skipping `excluded`
    pub fn top_excluding(&self, limit: usize, excluded: &HashSet<ProductId>) -> Vec<ProductId> {
        self.ranking
            .iter()
            .filter(|id| !excluded.contains(*id))
            .take(limit)
            .cloned()
            .collect()
    }
}
