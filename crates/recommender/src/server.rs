//! HTTP routes for the recommendation engine

use crate::error::RecommenderError;
use crate::recommendation::{EngineStatus, RecommendationEngine};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::DatabasePool;
use tracing::info;

/// Application state shared across all handlers
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    /// Pool behind the feed source, probed by the health check
    pub database: Option<DatabasePool>,
}

/// Optional `?limit=` on every recommendation route
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
    recommender_trained: bool,
    engine: EngineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_healthy: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub trained: bool,
}

async fn health(state: web::Data<AppState>) -> impl Responder {
    let engine = state.engine.status();
    let database_healthy = match &state.database {
        Some(pool) => Some(pool.is_healthy().await),
        None => None,
    };
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "recommender-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        recommender_trained: engine.trained,
        engine,
        database_healthy,
    })
}

/// GET /api/recommendations - popular products for anonymous callers
async fn popular(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, RecommenderError> {
    let limit = query
        .limit
        .unwrap_or(state.engine.config().default_popular_limit);
    let recommendations = state.engine.recommend_popular(limit).await?;
    Ok(HttpResponse::Ok().json(recommendations))
}

/// GET /api/recommendations/{user_id}
async fn for_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, RecommenderError> {
    let user_id = path.into_inner();
    let limit = query
        .limit
        .unwrap_or(state.engine.config().default_user_limit);
    let recommendations = state.engine.recommend_for_user(&user_id, limit).await?;
    Ok(HttpResponse::Ok().json(recommendations))
}

/// GET /api/products/{product_id}/recommendations
async fn for_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, RecommenderError> {
    let product_id = path.into_inner();
    let limit = query
        .limit
        .unwrap_or(state.engine.config().default_product_limit);
    let recommendations = state
        .engine
        .recommend_for_product(&product_id, limit)
        .await?;
    Ok(HttpResponse::Ok().json(recommendations))
}

/// POST /api/recommendations/train - rebuild every model from fresh feeds
async fn train(state: web::Data<AppState>) -> impl Responder {
    info!("Retraining requested");
    let trained = state.engine.train().await;
    HttpResponse::Ok().json(TrainResponse { trained })
}

/// Configure application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            .route("/recommendations", web::get().to(popular))
            .route("/recommendations/train", web::post().to(train))
            .route("/recommendations/{user_id}", web::get().to(for_user))
            .route(
                "/products/{product_id}/recommendations",
                web::get().to(for_product),
            ),
    );
}
