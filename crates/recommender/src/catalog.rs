//! Catalog Index
//!
//! In-memory snapshot of the product catalog for one training cycle. The
//! similarity matrices are positional, so the index keeps a stable
//! position <-> product id mapping in feed order.

use crate::types::{ProductId, ProductRecord};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIndex {
    products: Vec<ProductRecord>,
    positions: HashMap<ProductId, usize>,
}

impl CatalogIndex {
    /// Build the index from a catalog feed
    ///
    /// Returns `None` for an empty feed: there is no content model to build.
    /// Duplicate ids keep their first occurrence.
    pub fn load(rows: Vec<ProductRecord>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let mut products = Vec::with_capacity(rows.len());
        let mut positions = HashMap::with_capacity(rows.len());
        let mut duplicates = 0usize;

        for row in rows {
            if positions.contains_key(&row.id) {
                duplicates += 1;
                continue;
            }
            positions.insert(row.id.clone(), products.len());
            products.push(row);
        }

        if duplicates > 0 {
            warn!(duplicates, "Dropped duplicate product ids from catalog feed");
        }

        Some(Self {
            products,
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.position(id).map(|pos| &self.products[pos])
    }

    pub fn at(&self, position: usize) -> Option<&ProductRecord> {
        self.products.get(position)
    }

    /// Products in catalog order
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    /// Per-product content text (category + description), in catalog order
    pub fn content_corpus(&self) -> Vec<String> {
        self.products.iter().map(ProductRecord::content_text).collect()
    }
}
