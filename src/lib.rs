use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod monitoring;
pub mod signature;
pub mod state;
pub mod store;
pub mod webhook;

use monitoring::{monitoring_router, request_logging_middleware};
use state::AppState;

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .merge(webhook::create_webhook_router())
        .merge(api::create_api_router())
        .merge(monitoring_router())
        .with_state(app_state)
        .layer(axum_middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
