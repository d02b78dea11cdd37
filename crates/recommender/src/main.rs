//! Recommender Service - product recommendations for the storefront
//!
//! Port: 8083

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use storefront_core::{
    init_logging, load_dotenv, ConfigLoader, DatabaseConfig, DatabasePool, LogConfig, LogFormat,
    ServiceConfig,
};
use storefront_recommender::server::{self, AppState};
use storefront_recommender::{EngineConfig, PostgresFeedSource, RecommendationEngine};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let service_config = ServiceConfig::from_env()?;
    service_config.validate()?;

    init_logging(&LogConfig {
        format: LogFormat::from_env(),
        level: service_config.log_level.clone(),
        service_name: "recommender-service".to_string(),
    })?;

    let engine_config = EngineConfig::load()?;
    let db_config = DatabaseConfig::from_env()?;
    db_config.validate()?;

    let db = DatabasePool::new(&db_config).await?;
    let source = Arc::new(PostgresFeedSource::new(db.pool().clone()));
    let train_on_startup = engine_config.train_on_startup;
    let engine = Arc::new(RecommendationEngine::new(source, engine_config));

    if train_on_startup {
        if engine.train().await {
            info!("Recommendation models trained at startup");
        } else {
            warn!("Startup training failed, queries will retry lazily");
        }
    }

    let bind_addr = service_config.bind_addr();
    info!("Recommender Service listening on {}", bind_addr);

    let app_state = web::Data::new(AppState {
        engine,
        database: Some(db),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(server::configure_routes)
            .wrap(Logger::default())
    })
    .workers(service_config.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
