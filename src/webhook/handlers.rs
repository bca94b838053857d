//! Webhook ingestion: verify signature, validate payload, insert, record.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::IncomingMessage;
use crate::monitoring::metrics::record_webhook_result;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Ingestion outcome attached to the response extensions so the request
/// logging middleware can fold it into the per-request log record.
#[derive(Debug, Clone)]
pub struct WebhookOutcome {
    pub message_id: Option<String>,
    pub result: &'static str,
    pub dup: bool,
}

fn with_outcome(mut response: Response, outcome: WebhookOutcome) -> Response {
    response.extensions_mut().insert(outcome);
    response
}

/// POST /webhook
///
/// Terminal at first failure: signature, then payload shape, then the
/// idempotent insert. A duplicate id is not an error; the caller gets the
/// same 200 either way and only the internal log/metric distinguishes a
/// replay from a first delivery.
pub async fn post_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !state.verifier.verify(&body, signature) {
        record_webhook_result("invalid_signature");
        let response = AppError::Authentication {
            message: "invalid signature".to_string(),
        }
        .into_response();
        return Ok(with_outcome(
            response,
            WebhookOutcome {
                message_id: None,
                result: "invalid_signature",
                dup: false,
            },
        ));
    }

    let msg = match IncomingMessage::parse(&body) {
        Ok(msg) => msg,
        Err(e) => {
            record_webhook_result("validation_error");
            return Ok(with_outcome(
                e.into_response(),
                WebhookOutcome {
                    message_id: None,
                    result: "validation_error",
                    dup: false,
                },
            ));
        }
    };

    let outcome = state.store.insert(&msg).await?;
    record_webhook_result(outcome.as_str());

    let response = Json(json!({ "status": "ok" })).into_response();
    Ok(with_outcome(
        response,
        WebhookOutcome {
            message_id: Some(msg.message_id),
            result: outcome.as_str(),
            dup: outcome.is_duplicate(),
        },
    ))
}
