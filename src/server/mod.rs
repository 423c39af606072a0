pub mod handlers;
pub mod query;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::AppError;
use crate::pipeline::StatsEngine;

pub fn router(engine: Arc<StatsEngine>) -> Router {
    Router::new()
        .route("/api/stats", get(handlers::stats))
        .route("/api/stats/stream", get(handlers::stats_stream))
        .with_state(engine)
}

pub async fn serve(engine: Arc<StatsEngine>, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::ConfigError(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, "listening");
    axum::serve(listener, router(engine))
        .await
        .map_err(|e| AppError::HttpError(e.to_string()))
}
