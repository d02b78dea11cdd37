//! Feed sources
//!
//! The engine reads two read-only feeds once per training cycle: the product
//! catalog and the user-product interaction log.

use crate::error::Result;
use crate::types::{InteractionRecord, ProductRecord};
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::{PgPool, Row};
use storefront_core::validation::validate_rating;
use tracing::{debug, warn};

/// Supplier of the catalog and interaction feeds
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Snapshot of every product in the catalog
    async fn fetch_catalog(&self) -> Result<Vec<ProductRecord>>;

    /// Interaction rows with an associated user
    async fn fetch_interactions(&self) -> Result<Vec<InteractionRecord>>;
}

/// PostgreSQL-backed feeds over the storefront schema
///
/// Interaction rows are order line items joined to their order; line items
/// whose order has no user are discarded.
pub struct PostgresFeedSource {
    pool: PgPool,
}

impl PostgresFeedSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn clamp_rating(product_id: &str, rating: f32) -> f32 {
    match validate_rating(rating) {
        Ok(()) => rating,
        Err(e) => {
            warn!(product_id, error = %e, "Clamping out-of-range product rating");
            if rating.is_nan() {
                0.0
            } else {
                rating.clamp(0.0, 5.0)
            }
        }
    }
}

#[async_trait]
impl FeedSource for PostgresFeedSource {
    async fn fetch_catalog(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                CAST(id AS TEXT) AS id,
                name,
                description,
                category,
                CAST(price AS DOUBLE PRECISION) AS price,
                CAST(COALESCE(rating, 0) AS REAL) AS rating,
                CAST(COALESCE(stock, 0) AS BIGINT) AS stock
            FROM product
            ORDER BY product.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let rating: f32 = row.try_get("rating")?;
            let stock: i64 = row.try_get("stock")?;

            products.push(ProductRecord {
                rating: clamp_rating(&id, rating),
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                category: row.try_get("category")?,
                price: row.try_get::<f64, _>("price")?.max(0.0),
                stock: u32::try_from(stock.max(0)).unwrap_or(u32::MAX),
                id,
            });
        }

        debug!(products = products.len(), "Fetched catalog feed");
        Ok(products)
    }

    async fn fetch_interactions(&self) -> Result<Vec<InteractionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                CAST(o.user_id AS TEXT) AS user_id,
                CAST(oi.product_id AS TEXT) AS product_id,
                COUNT(*) AS interactions
            FROM order_item oi
            JOIN "order" o ON oi.order_id = o.id
            WHERE o.user_id IS NOT NULL
            GROUP BY o.user_id, oi.product_id
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut interactions = Vec::with_capacity(rows.len());
        for row in rows {
            let count: i64 = row.try_get("interactions")?;
            interactions.push(InteractionRecord {
                user_id: row.try_get("user_id")?,
                product_id: row.try_get("product_id")?,
                count: u32::try_from(count.max(0)).unwrap_or(u32::MAX),
            });
        }

        debug!(rows = interactions.len(), "Fetched interaction feed");
        Ok(interactions)
    }
}

/// Feeds held in memory, replaceable between training cycles
#[derive(Default)]
pub struct InMemoryFeedSource {
    catalog: RwLock<Vec<ProductRecord>>,
    interactions: RwLock<Vec<InteractionRecord>>,
}

impl InMemoryFeedSource {
    pub fn new(catalog: Vec<ProductRecord>, interactions: Vec<InteractionRecord>) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            interactions: RwLock::new(interactions),
        }
    }

    pub fn replace_catalog(&self, catalog: Vec<ProductRecord>) {
        *self.catalog.write() = catalog;
    }

    pub fn replace_interactions(&self, interactions: Vec<InteractionRecord>) {
        *self.interactions.write() = interactions;
    }

    pub fn push_interaction(&self, interaction: InteractionRecord) {
        self.interactions.write().push(interaction);
    }
}

#[async_trait]
impl FeedSource for InMemoryFeedSource {
    async fn fetch_catalog(&self) -> Result<Vec<ProductRecord>> {
        Ok(self.catalog.read().clone())
    }

    async fn fetch_interactions(&self) -> Result<Vec<InteractionRecord>> {
        Ok(self.interactions.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating("p", 4.2), 4.2);
        assert_eq!(clamp_rating("p", 7.0), 5.0);
        assert_eq!(clamp_rating("p", -1.0), 0.0);
        assert_eq!(clamp_rating("p", f32::NAN), 0.0);
    }

    #[tokio::test]
    async fn test_in_memory_source_replaces_feeds() {
        let source = InMemoryFeedSource::default();
        assert!(source.fetch_catalog().await.unwrap().is_empty());

        source.push_interaction(InteractionRecord::event("u1", "p1"));
        source.push_interaction(InteractionRecord::event("u1", "p2"));
        assert_eq!(source.fetch_interactions().await.unwrap().len(), 2);

        source.replace_interactions(Vec::new());
        assert!(source.fetch_interactions().await.unwrap().is_empty());
    }
}
