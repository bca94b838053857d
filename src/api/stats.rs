//! GET /stats — aggregates over all stored messages.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::state::AppState;
use crate::store::SenderCount;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_messages: i64,
    pub senders_count: i64,
    pub messages_per_sender: Vec<SenderCount>,
    pub first_message_ts: Option<String>,
    pub last_message_ts: Option<String>,
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>> {
    let summary = state.store.stats().await?;

    Ok(Json(StatsResponse {
        total_messages: summary.total,
        senders_count: summary.senders,
        messages_per_sender: summary.top_senders,
        first_message_ts: summary.first_ts,
        last_message_ts: summary.last_ts,
    }))
}
