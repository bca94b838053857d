pub mod messages;
pub mod stats;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// Read-side routes: paginated listing and aggregate stats.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/messages", get(messages::list_messages))
        .route("/stats", get(stats::get_stats))
}
