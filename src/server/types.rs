// Gateway request/response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;
use crate::store::ChatLogEntry;

/// POST /api/chat body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Parse a raw request body, rejecting anything that is not a JSON
    /// object with a non-blank `message` string.
    ///
    /// Goes through `Value` first: a derived `Deserialize` would also accept
    /// a positional array such as `["hello"]`.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidInput)?;
        let message = match value.get("message") {
            Some(Value::String(message)) if value.is_object() => message,
            _ => return Err(ApiError::InvalidInput),
        };
        if message.trim().is_empty() {
            return Err(ApiError::InvalidInput);
        }
        Ok(Self {
            message: message.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<ChatLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
