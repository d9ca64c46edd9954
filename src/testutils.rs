use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use url::Url;

use crate::config::{Config, Credential};
use crate::handlers::AppState;

#[derive(Debug, Clone)]
pub struct ReceivedPush {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: String,
    delay: Duration,
    received: Arc<Mutex<Vec<ReceivedPush>>>,
}

/// Stand-in for the LINE push endpoint that records every request it gets.
pub struct MockPushApi {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedPush>>>,
}

impl MockPushApi {
    pub async fn start(status: StatusCode, reply: Value) -> Self {
        Self::spawn(status, reply.to_string(), Duration::ZERO).await
    }

    pub async fn start_raw(status: StatusCode, reply: &str) -> Self {
        Self::spawn(status, reply.to_string(), Duration::ZERO).await
    }

    pub async fn start_delayed(delay: Duration) -> Self {
        Self::spawn(StatusCode::OK, "{}".to_string(), delay).await
    }

    async fn spawn(status: StatusCode, reply: String, delay: Duration) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            reply,
            delay,
            received: received.clone(),
        };
        let app = Router::new().route("/push", post(record)).with_state(state);
        let addr = serve(app).await;
        Self { addr, received }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/push", self.addr)).unwrap()
    }

    pub fn hits(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn received(&self) -> Vec<ReceivedPush> {
        self.received.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .received
        .lock()
        .unwrap()
        .push(ReceivedPush {
            authorization,
            body,
        });

    tokio::time::sleep(state.delay).await;
    (
        state.status,
        [(CONTENT_TYPE, "application/json")],
        state.reply.clone(),
    )
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A port nothing listens on.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn test_config(push_endpoint: Url, token: Option<&str>) -> Config {
    Config {
        port: 0,
        channel_access_token: token.map(Credential::new),
        push_endpoint,
        upstream_timeout: Duration::from_secs(5),
        api_key: None,
    }
}

/// Serves the full relay router on an ephemeral port and returns its base URL.
pub async fn spawn_relay(config: Config) -> String {
    let state = Arc::new(AppState::new(config).unwrap());
    let addr = serve(crate::app(state)).await;
    format!("http://{addr}")
}
