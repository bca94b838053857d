//! Health probes and metrics exposition.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::state::AppState;

use super::metrics;

pub fn monitoring_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check))
        .route("/metrics", get(prometheus_metrics))
}

/// Liveness: the process is up.
async fn liveness_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

/// Readiness: the process is correctly configured. An unset webhook secret
/// means every ingest would be rejected, so the instance reports 503.
async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.verifier.is_configured() {
        (StatusCode::OK, Json(serde_json::json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "not_ready",
                "reason": "webhook secret is not configured"
            })),
        )
    }
}

async fn prometheus_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
