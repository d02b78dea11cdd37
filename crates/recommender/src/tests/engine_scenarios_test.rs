//! Engine lifecycle and fallback scenarios

use crate::config::EngineConfig;
use crate::recommendation::RecommendationEngine;
use crate::source::InMemoryFeedSource;
use crate::types::{InteractionRecord, ProductRecord, RecommendationSource};
use std::sync::Arc;

fn product(id: &str, category: &str, description: &str, rating: f32) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        name: format!("Product {}", id),
        description: Some(description.to_string()),
        category: category.to_string(),
        price: 19.99,
        rating,
        stock: 5,
    }
}

fn storefront_catalog() -> Vec<ProductRecord> {
    vec![
        product("A", "Electronics", "wireless headphones", 4.0),
        product("B", "Electronics", "bluetooth headphones", 3.5),
        product("C", "Books", "mystery novel", 4.8),
        product("D", "Books", "cookbook recipes", 2.0),
        product("E", "Garden", "garden hose", 5.0),
    ]
}

fn storefront_log() -> Vec<InteractionRecord> {
    vec![
        InteractionRecord::event("u1", "A"),
        InteractionRecord::event("u1", "B"),
        InteractionRecord::event("u2", "A"),
        InteractionRecord::event("u2", "C"),
        InteractionRecord::event("u3", "B"),
        InteractionRecord::event("u3", "C"),
        InteractionRecord::event("u4", "A"),
        InteractionRecord::event("u4", "D"),
        InteractionRecord::event("u5", "E"),
    ]
}

fn engine_with(
    catalog: Vec<ProductRecord>,
    log: Vec<InteractionRecord>,
) -> (Arc<InMemoryFeedSource>, RecommendationEngine) {
    let source = Arc::new(InMemoryFeedSource::new(catalog, log));
    let engine = RecommendationEngine::new(source.clone(), EngineConfig::default());
    (source, engine)
}

#[tokio::test]
async fn test_collaborative_recommendations_for_known_user() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    let recs = engine.recommend_for_user("u1", 10).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::Collaborative);
    assert_eq!(recs.ids(), vec!["C", "D"]);
    assert_eq!(recs.items[0].name, "Product C");
}

#[tokio::test]
async fn test_user_without_candidates_gets_popularity_minus_owned() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    // u5 only bought E, which nobody else bought
    let recs = engine.recommend_for_user("u5", 10).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::Popularity);
    assert_eq!(recs.ids(), vec!["C", "A", "B", "D"]);
}

#[tokio::test]
async fn test_cold_start_user_gets_popularity() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    let recs = engine.recommend_for_user("stranger", 3).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::Popularity);
    assert_eq!(recs.ids(), vec!["E", "C", "A"]);
}

#[tokio::test]
async fn test_empty_log_degrades_to_rating_order() {
    let (_, engine) = engine_with(
        vec![
            product("1", "Toys", "robot", 4.5),
            product("2", "Toys", "kite", 3.0),
            product("3", "Toys", "puzzle", 5.0),
        ],
        vec![],
    );

    assert!(!engine.train().await);
    assert!(!engine.is_trained());

    let recs = engine.recommend_for_user("anyone", 3).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::Popularity);
    assert_eq!(recs.ids(), vec!["3", "1", "2"]);

    let popular = engine.recommend_popular(3).await.unwrap();
    assert_eq!(popular.ids(), recs.ids());
}

#[tokio::test]
async fn test_content_recommendations_rank_shared_terms_first() {
    let (_, engine) = engine_with(
        vec![
            product("1", "Electronics", "wireless headphones", 0.0),
            product("2", "Electronics", "bluetooth headphones", 0.0),
            product("3", "Books", "novel", 0.0),
        ],
        vec![InteractionRecord::event("u1", "3")],
    );

    let recs = engine.recommend_for_product("1", 2).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::ContentBased);
    assert_eq!(recs.ids(), vec!["2", "3"]);
}

#[tokio::test]
async fn test_product_results_never_contain_seed() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    for seed in ["A", "B", "C", "D", "E"] {
        let recs = engine.recommend_for_product(seed, 10).await.unwrap();
        assert!(!recs.ids().contains(&seed), "seed {} returned", seed);
        assert!(recs.len() <= 10);
    }
}

#[tokio::test]
async fn test_unknown_seed_falls_back_without_seed() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    let recs = engine.recommend_for_product("Z", 2).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::Popularity);
    assert_eq!(recs.ids(), vec!["E", "C"]);

    // Untrained engine: the fallback still leaves out the seed
    let (_, untrained) = engine_with(storefront_catalog(), vec![]);
    let recs = untrained.recommend_for_product("E", 2).await.unwrap();
    assert_eq!(recs.ids(), vec!["C", "A"]);
}

#[tokio::test]
async fn test_retraining_is_idempotent() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    assert!(engine.train().await);
    let first = engine.models().unwrap();
    let first_recs = engine.recommend_for_user("u1", 5).await.unwrap();

    assert!(engine.train().await);
    let second = engine.models().unwrap();
    let second_recs = engine.recommend_for_user("u1", 5).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.catalog(), second.catalog());
    assert_eq!(first.interactions(), second.interactions());
    assert_eq!(first.collaborative(), second.collaborative());
    assert_eq!(first.content(), second.content());
    assert_eq!(first.popularity(), second.popularity());
    assert_eq!(first_recs, second_recs);
}

#[tokio::test]
async fn test_repeated_queries_are_deterministic() {
    let (_, engine) = engine_with(storefront_catalog(), storefront_log());

    let a = engine.recommend_for_user("u4", 5).await.unwrap();
    let b = engine.recommend_for_user("u4", 5).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_retrain_replaces_state_and_failure_untrains() {
    let (source, engine) = engine_with(storefront_catalog(), storefront_log());
    assert!(engine.train().await);
    assert_eq!(engine.status().users, 5);

    source.push_interaction(InteractionRecord::event("u6", "E"));
    assert!(engine.train().await);
    assert_eq!(engine.status().users, 6);

    source.replace_interactions(Vec::new());
    assert!(!engine.train().await);
    assert!(!engine.is_trained());

    let recs = engine.recommend_for_user("u1", 2).await.unwrap();
    assert_eq!(recs.source, RecommendationSource::Popularity);
    assert_eq!(recs.ids(), vec!["E", "C"]);
}

#[tokio::test]
async fn test_empty_catalog_returns_empty_list() {
    let (_, engine) = engine_with(vec![], vec![]);

    let recs = engine.recommend_for_user("u1", 5).await.unwrap();
    assert!(recs.is_empty());
    assert_eq!(recs.source, RecommendationSource::Popularity);
}
