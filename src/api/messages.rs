//! GET /messages — paginated, filtered listing.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::models::Message;
use crate::state::AppState;
use crate::store::{MessageFilter, Page};

#[derive(Debug, Deserialize)]
pub struct MessagesParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub from: Option<String>,
    pub since: Option<String>,
    pub q: Option<String>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub data: Vec<Message>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Parameters pass straight through to the store; clamping of absurd
/// limit/offset values is the store's policy and the response echoes the
/// effective values. Empty filter strings mean "no filter".
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MessagesParams>,
) -> Result<Json<MessagesResponse>> {
    let filter = MessageFilter {
        from: params.from.filter(|s| !s.is_empty()),
        since: params.since.filter(|s| !s.is_empty()),
        q: params.q.filter(|s| !s.is_empty()),
    };
    let page = Page {
        limit: params.limit,
        offset: params.offset,
    }
    .clamped();

    let (total, data) = state.store.query(&filter, page).await?;

    Ok(Json(MessagesResponse {
        data,
        total,
        limit: page.limit,
        offset: page.offset,
    }))
}
