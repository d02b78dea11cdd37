//! Interaction Matrix Builder
//!
//! Aggregates the purchase log into a sparse user x product count matrix.
//! Counts are implicit feedback (purchase frequency), not ratings.

use crate::catalog::CatalogIndex;
use crate::types::{InteractionRecord, ProductId, UserId};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Sparse user x product count matrix
///
/// Users are ordered by id. Item columns are the products that appear in the
/// log, ordered by catalog position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionMatrix {
    users: Vec<UserId>,
    user_index: HashMap<UserId, usize>,
    items: Vec<ProductId>,
    item_index: HashMap<ProductId, usize>,
    /// row per user: item column -> count
    rows: Vec<BTreeMap<usize, u32>>,
    /// total count per product across all users
    product_counts: HashMap<ProductId, u64>,
}

impl InteractionMatrix {
    /// Aggregate raw rows by (user, product)
    ///
    /// Rows that reference products missing from the catalog, or that carry a
    /// zero count, are dropped. Sums saturate at `u32::MAX`. An empty log
    /// yields an empty matrix.
    pub fn build(log: &[InteractionRecord], catalog: &CatalogIndex) -> Self {
        let mut aggregated: BTreeMap<&str, BTreeMap<usize, u32>> = BTreeMap::new();
        let mut dangling = 0usize;

        for record in log {
            if record.count == 0 {
                continue;
            }
            let Some(position) = catalog.position(&record.product_id) else {
                dangling += 1;
                continue;
            };
            let cell = aggregated
                .entry(record.user_id.as_str())
                .or_default()
                .entry(position)
                .or_insert(0);
            *cell = cell.saturating_add(record.count);
        }

        if dangling > 0 {
            warn!(
                dropped = dangling,
                "Dropped interactions referencing products missing from the catalog"
            );
        }

        // Catalog positions in use, ascending, become the item columns
        let mut used_positions: Vec<usize> = aggregated
            .values()
            .flat_map(|row| row.keys().copied())
            .collect();
        used_positions.sort_unstable();
        used_positions.dedup();

        let column_of: HashMap<usize, usize> = used_positions
            .iter()
            .enumerate()
            .map(|(col, pos)| (*pos, col))
            .collect();

        let items: Vec<ProductId> = used_positions
            .iter()
            .filter_map(|pos| catalog.at(*pos).map(|p| p.id.clone()))
            .collect();
        let item_index = items
            .iter()
            .enumerate()
            .map(|(col, id)| (id.clone(), col))
            .collect();

        let mut users = Vec::with_capacity(aggregated.len());
        let mut user_index = HashMap::with_capacity(aggregated.len());
        let mut rows = Vec::with_capacity(aggregated.len());
        let mut product_counts: HashMap<ProductId, u64> = HashMap::new();

        for (user_id, by_position) in aggregated {
            user_index.insert(user_id.to_string(), users.len());
            users.push(user_id.to_string());

            let row: BTreeMap<usize, u32> = by_position
                .into_iter()
                .map(|(pos, count)| (column_of[&pos], count))
                .collect();
            for (&col, &count) in &row {
                *product_counts.entry(items[col].clone()).or_insert(0) += u64::from(count);
            }
            rows.push(row);
        }

        Self {
            users,
            user_index,
            items,
            item_index,
            rows,
            product_counts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Product id of each item column
    pub fn items(&self) -> &[ProductId] {
        &self.items
    }

    pub fn item_column(&self, product_id: &str) -> Option<usize> {
        self.item_index.get(product_id).copied()
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_index.contains_key(user_id)
    }

    pub fn count(&self, user_id: &str, product_id: &str) -> u32 {
        match (self.user_index.get(user_id), self.item_column(product_id)) {
            (Some(&row), Some(col)) => self.rows[row].get(&col).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Sparse row of a user: (item column, count) with count > 0
    pub fn user_row(&self, user_id: &str) -> Option<&BTreeMap<usize, u32>> {
        self.user_index.get(user_id).map(|&row| &self.rows[row])
    }

    /// All sparse rows in user order
    pub fn rows(&self) -> &[BTreeMap<usize, u32>] {
        &self.rows
    }

    /// Item columns the user has interacted with
    pub fn owned_columns(&self, user_id: &str) -> Vec<usize> {
        self.user_row(user_id)
            .map(|row| {
                row.iter()
                    .filter(|(_, &count)| count > 0)
                    .map(|(&col, _)| col)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Product ids the user has interacted with
    pub fn owned_products(&self, user_id: &str) -> Vec<ProductId> {
        self.owned_columns(user_id)
            .into_iter()
            .map(|col| self.items[col].clone())
            .collect()
    }

    /// Total interaction count of a product, 0 when never purchased
    pub fn product_count(&self, product_id: &str) -> u64 {
        self.product_counts.get(product_id).copied().unwrap_or(0)
    }
}
