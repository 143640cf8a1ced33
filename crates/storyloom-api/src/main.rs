//! Storyloom API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use storyloom_api::routes;
use storyloom_api::state::AppState;
use storyloom_core::clock::SystemClock;
use storyloom_core::embedding::DeferredEmbeddingProvider;
use storyloom_detection::DetectionConfig;
use storyloom_store::{PgArcRepository, PgStoryRepository, PgSummaryRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storyloom API server");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable must be set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;

    let mut detection_config = DetectionConfig::default();
    if let Ok(threshold) = std::env::var("STORYLOOM_SIMILARITY_THRESHOLD") {
        detection_config.similarity_threshold = threshold
            .parse()
            .map_err(|e| format!("STORYLOOM_SIMILARITY_THRESHOLD must be a float: {e}"))?;
    }
    if let Ok(days) = std::env::var("STORYLOOM_WINDOW_DAYS") {
        detection_config.window = Duration::days(
            days.parse()
                .map_err(|e| format!("STORYLOOM_WINDOW_DAYS must be an integer: {e}"))?,
        );
    }

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    // Build application state. Vectors arrive via the external backfill
    // pipeline, so inline embedding stays deferred.
    let app_state = AppState::new(
        Arc::new(PgStoryRepository::new(pool.clone())),
        Arc::new(PgArcRepository::new(pool.clone())),
        Arc::new(PgSummaryRepository::new(pool)),
        Arc::new(DeferredEmbeddingProvider::new(1536)),
        Arc::new(SystemClock),
        detection_config,
    )?;

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/arcs", routes::arcs::router())
        .nest("/api/v1/stories", routes::stories::router())
        .nest("/api/v1/dwellers", routes::dwellers::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
