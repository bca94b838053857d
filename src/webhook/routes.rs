use axum::{routing::post, Router};
use std::sync::Arc;

use crate::state::AppState;

use super::handlers::post_webhook;

/// Webhook ingestion routes.
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(post_webhook))
}
