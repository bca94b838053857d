//! Per-request logging and metrics.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::webhook::WebhookOutcome;

use super::metrics::record_http_request;

/// Wraps every request: assigns a v4 request id, times the handler,
/// updates the HTTP counters/histogram and emits exactly one structured
/// log record. The webhook handler attaches its outcome to the response
/// extensions so the record also carries message id and dedup result.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    record_http_request(&path, status, latency_ms);

    match response.extensions().get::<WebhookOutcome>() {
        Some(outcome) => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            message_id = outcome.message_id.as_deref().unwrap_or(""),
            result = outcome.result,
            dup = outcome.dup,
            "request"
        ),
        None => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "request"
        ),
    }

    response
}
