use log::{error, info, warn};
use uuid::Uuid;

use crate::config::Credential;
use crate::error::RelayError;
use crate::push::PushClient;
use crate::types::{RelayRequest, RelayResponse};

pub const SENT_MESSAGE: &str = "Message sent successfully to LINE!";

/// Checks the credential, validates `body`, then pushes the message.
///
/// Nothing goes out on the network unless both checks pass.
pub async fn relay(
    push: &PushClient,
    credential: Option<&Credential>,
    body: &[u8],
) -> Result<RelayResponse, RelayError> {
    let relay_id = Uuid::new_v4();
    let result = forward(push, credential, body, relay_id).await;

    match &result {
        Ok(_) => info!("[{}] Message delivered to push API", relay_id),
        Err(RelayError::MissingCredential) => {
            error!("[{}] LINE_CHANNEL_ACCESS_TOKEN is not configured", relay_id)
        }
        Err(RelayError::Transport(e)) => error!("[{}] Relay failed: {:#}", relay_id, e),
        Err(e) => warn!("[{}] Relay rejected: {}", relay_id, e),
    }

    result
}

async fn forward(
    push: &PushClient,
    credential: Option<&Credential>,
    body: &[u8],
    relay_id: Uuid,
) -> Result<RelayResponse, RelayError> {
    let credential = credential.ok_or(RelayError::MissingCredential)?;
    let message = RelayRequest::from_slice(body)?.into_push_message()?;

    match &message.to {
        Some(to) => info!("[{}] Pushing message to {}", relay_id, to),
        None => info!("[{}] Pushing message with no recipient", relay_id),
    }
    let line_response = push.push(credential, &message).await?;

    Ok(RelayResponse {
        success: true,
        message: SENT_MESSAGE.to_string(),
        line_response,
    })
}
