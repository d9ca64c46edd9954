use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::RelayError;
use crate::push::PushClient;
use crate::relay::relay;
use crate::types::HealthResponse;

pub struct AppState {
    pub config: Config,
    pub push: PushClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let push = PushClient::new(config.push_endpoint.clone(), config.upstream_timeout)?;
        Ok(Self { config, push })
    }
}

/// Guards the relay routes when `RELAY_API_KEY` is configured.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let Some(api_key) = state.config.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

    if bool::from(token.as_bytes().ct_eq(api_key.as_bytes())) {
        Ok(next.run(req).await)
    } else {
        Err(RelayError::Unauthenticated)
    }
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, RelayError> {
    let response = relay(
        &state.push,
        state.config.channel_access_token.as_ref(),
        &body,
    )
    .await?;

    Ok((StatusCode::OK, Json(response)))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "method not allowed" })),
    )
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.config.channel_access_token.is_some() {
        "ok"
    } else {
        "no_credential"
    };
    Json(HealthResponse {
        status: status.to_string(),
    })
}
