//! Item-based collaborative filtering
//!
//! Item-item cosine similarity over co-occurrence in user histories
//! ("users who bought X also bought Y"). No content signal is used.

use crate::config::{DEFAULT_NEIGHBOR_CAP, DEFAULT_SIMILARITY_THRESHOLD};
use crate::interaction::InteractionMatrix;
use crate::types::{compare_product_ids, ModelOutcome, ProductId, UnavailableReason};
use ndarray::Array2;
use std::collections::{HashMap, HashSet};

/// Neighbor fan-out and noise floor for user recommendations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborParams {
    /// Most-similar items considered per owned item
    pub neighbor_cap: usize,
    /// Candidates with similarity at or below this are ignored
    pub similarity_threshold: f32,
}

impl Default for NeighborParams {
    fn default() -> Self {
        Self {
            neighbor_cap: DEFAULT_NEIGHBOR_CAP,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Symmetric item x item similarity matrix indexed like the interaction
/// matrix's item columns
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSimilarityModel {
    items: Vec<ProductId>,
    item_index: HashMap<ProductId, usize>,
    similarity: Array2<f32>,
}

impl ItemSimilarityModel {
    /// Cosine similarity between item columns of `matrix`
    ///
    /// Returns `None` for an empty matrix.
    pub fn build(matrix: &InteractionMatrix) -> Option<Self> {
        if matrix.is_empty() || matrix.num_items() == 0 {
            return None;
        }

        let n_items = matrix.num_items();
        let mut item_user = Array2::<f32>::zeros((n_items, matrix.num_users()));
        for (user, row) in matrix.rows().iter().enumerate() {
            for (&item, &count) in row {
                item_user[[item, user]] = count as f32;
            }
        }

        let norms: Vec<f32> = item_user
            .rows()
            .into_iter()
            .map(|row| row.dot(&row).sqrt())
            .collect();

        let mut similarity = item_user.dot(&item_user.t());
        for i in 0..n_items {
            for j in 0..n_items {
                let denom = norms[i] * norms[j];
                similarity[[i, j]] = if i == j {
                    1.0
                } else if denom > 0.0 {
                    (similarity[[i, j]] / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
            }
        }

        let items = matrix.items().to_vec();
        let item_index = items
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        Some(Self {
            items,
            item_index,
            similarity,
        })
    }

    /// Model over a precomputed similarity matrix, rows ordered like `items`
    #[cfg(test)]
    pub(crate) fn from_similarity(items: Vec<ProductId>, similarity: Array2<f32>) -> Self {
        let item_index = items
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        Self {
            items,
            item_index,
            similarity,
        }
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Similarity of two products, `None` if either never appears in the log
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let i = *self.item_index.get(a)?;
        let j = *self.item_index.get(b)?;
        Some(self.similarity[[i, j]])
    }

    /// Up to `k` most similar other items, similarity descending then
    /// product id ascending
    fn neighbors(&self, item: usize, k: usize) -> Vec<(usize, f32)> {
        let mut candidates: Vec<(usize, f32)> = (0..self.items.len())
            .filter(|&other| other != item)
            .map(|other| (other, self.similarity[[item, other]]))
            .collect();
        candidates.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| compare_product_ids(&self.items[a.0], &self.items[b.0]))
        });
        candidates.truncate(k);
        candidates
    }

    /// Rank unseen products for a user by summed similarity to the products
    /// they already own
    pub fn recommend_for_user(
        &self,
        interactions: &InteractionMatrix,
        user_id: &str,
        limit: usize,
        params: NeighborParams,
    ) -> ModelOutcome {
        if !interactions.contains_user(user_id) {
            return ModelOutcome::Unavailable(UnavailableReason::UnknownUser);
        }

        let owned: HashSet<usize> = interactions
            .owned_products(user_id)
            .iter()
            .filter_map(|id| self.item_index.get(id).copied())
            .collect();

        let mut scores: HashMap<usize, f32> = HashMap::new();
        let mut owned_sorted: Vec<usize> = owned.iter().copied().collect();
        owned_sorted.sort_unstable();

        for item in owned_sorted {
            for (candidate, similarity) in self.neighbors(item, params.neighbor_cap) {
                if owned.contains(&candidate) || similarity <= params.similarity_threshold {
                    continue;
                }
                *scores.entry(candidate).or_insert(0.0) += similarity;
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| compare_product_ids(&self.items[a.0], &self.items[b.0]))
        });

        let ids: Vec<ProductId> = ranked
            .into_iter()
            .take(limit)
            .map(|(item, _)| self.items[item].clone())
            .collect();

        if ids.is_empty() {
            ModelOutcome::Unavailable(UnavailableReason::NoCandidates)
        } else {
            ModelOutcome::Ranked(ids)
        }
    }
}
