use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use super::query::{validate, RawStatsQuery};
use crate::error::AppError;
use crate::pipeline::{StatsEngine, StatsMode};

/// GET /api/stats — whole-result endpoint.
pub async fn stats(
    State(engine): State<Arc<StatsEngine>>,
    Query(raw): Query<RawStatsQuery>,
) -> Response {
    let req = match validate(&raw, &engine.config().default_queues) {
        Ok(req) => req,
        Err(issues) => return error_response(AppError::InvalidQuery(issues)),
    };

    match engine.collect(&req).await {
        Ok(report) => (
            [(header::CACHE_CONTROL, "no-store")],
            Json(report),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/stats/stream — streaming endpoint. Query problems are the
/// only HTTP-level failure; once the stream starts, every failure
/// becomes an `error` event.
pub async fn stats_stream(
    State(engine): State<Arc<StatsEngine>>,
    Query(raw): Query<RawStatsQuery>,
) -> Response {
    let mut req = match validate(&raw, &engine.config().default_queues) {
        Ok(req) => req,
        Err(_) => return (StatusCode::BAD_REQUEST, "Bad Request").into_response(),
    };
    // The streaming surface carries no bucketing extras.
    req.mode = StatsMode::Year;

    let rx = engine.stream(req);
    let stream = UnboundedReceiverStream::new(rx).map(|event| Event::default().json_data(&event));
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn error_response(e: AppError) -> Response {
    let status = match &e {
        AppError::InvalidQuery(_) | AppError::InvalidRiotId => StatusCode::BAD_REQUEST,
        AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        AppError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = match &e {
        AppError::InvalidQuery(issues) => json!({ "error": e.code(), "issues": issues }),
        _ => json!({ "error": e.code() }),
    };
    (status, Json(body)).into_response()
}
