use std::time::Duration;

use anyhow::Context;
use log::{debug, warn};
use serde_json::Value;
use url::Url;

use crate::config::Credential;
use crate::error::RelayError;
use crate::types::PushMessage;

/// Client for the LINE push-message endpoint.
#[derive(Clone)]
pub struct PushClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl PushClient {
    /// The timeout covers the whole exchange, body included.
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build push API client")?;
        Ok(Self { client, endpoint })
    }

    /// Sends one push request and returns the API's JSON reply untouched.
    pub async fn push(
        &self,
        credential: &Credential,
        message: &PushMessage,
    ) -> Result<Value, RelayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(credential.expose())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Push API returned {}: {}", status, body);
            return Err(RelayError::rejected(status));
        }

        let body = response.bytes().await?;
        debug!("Push API accepted message ({} bytes)", body.len());
        serde_json::from_slice(&body)
            .context("Push API returned a non-JSON success body")
            .map_err(RelayError::Transport)
    }
}
