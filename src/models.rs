//! Message entity and inbound payload validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};

/// Persisted message row. Wire names use `from`/`to`; the columns keep the
/// msisdn suffix because the addresses are phone-number-like identifiers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub message_id: String,
    #[serde(rename = "from")]
    pub from_msisdn: String,
    #[serde(rename = "to")]
    pub to_msisdn: String,
    pub ts: String,
    pub text: Option<String>,
    /// Server-assigned first-seen timestamp, internal only.
    #[serde(skip_serializing)]
    pub created_at: String,
}

/// Candidate message as carried by the webhook payload, before the store
/// assigns `created_at`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IncomingMessage {
    #[validate(length(min = 1, message = "message_id must be non-empty"))]
    pub message_id: String,
    #[serde(rename = "from")]
    #[validate(length(min = 2, message = "from must be at least 2 characters"))]
    pub from_msisdn: String,
    #[serde(rename = "to")]
    #[validate(length(min = 2, message = "to must be at least 2 characters"))]
    pub to_msisdn: String,
    #[validate(length(min = 1, message = "ts must be non-empty"))]
    pub ts: String,
    #[validate(length(max = 4096, message = "text exceeds 4096 characters"))]
    pub text: Option<String>,
}

impl IncomingMessage {
    /// Parse and validate a raw webhook body. All-or-nothing: any missing
    /// field, wrong type or length violation rejects the whole payload.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let msg: IncomingMessage =
            serde_json::from_slice(raw).map_err(|e| AppError::Validation {
                message: format!("invalid payload: {}", e),
            })?;

        msg.validate().map_err(|e| AppError::Validation {
            message: format!("invalid payload: {}", e),
        })?;

        Ok(msg)
    }
}
