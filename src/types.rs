use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// Body of `POST /relay` as sent by the browser client.
///
/// `message` is kept untyped so a missing, non-string or blank value can all
/// be reported with the same validation error. `user_id` is opaque and goes
/// to the push API as-is.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Value>,
}

impl RelayRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(body).map_err(|e| {
            warn!("Unparsable relay body: {}", e);
            RelayError::MalformedBody
        })
    }

    /// Returns the trimmed message text.
    pub fn validate(&self) -> Result<&str, RelayError> {
        match &self.message {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim()),
            _ => Err(RelayError::InvalidMessage),
        }
    }

    pub fn into_push_message(self) -> Result<PushMessage, RelayError> {
        let text = self.validate()?.to_string();
        Ok(PushMessage::text(self.user_id, text))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushEntry {
    Text { text: String },
}

/// Request body of the LINE push-message API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
    pub messages: Vec<PushEntry>,
}

impl PushMessage {
    pub fn text(to: Option<Value>, text: impl Into<String>) -> Self {
        Self {
            to,
            messages: vec![PushEntry::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,
    pub line_response: Value,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}
