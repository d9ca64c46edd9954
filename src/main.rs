mod config;
mod error;
mod handlers;
mod push;
mod relay;
#[cfg(test)]
mod testutils;
mod types;

use std::sync::Arc;

use axum::handler::Handler;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

use config::Config;
use handlers::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    // Only POST is guarded so other methods still get 405 without a key.
    let send = handlers::send_message.layer(middleware::from_fn_with_state(
        state.clone(),
        handlers::require_api_key,
    ));
    let relay_route = post(send).fallback(handlers::method_not_allowed);

    // The browser client posts to /api/send-message; /relay is the canonical path.
    Router::new()
        .route("/relay", relay_route.clone())
        .route("/api/send-message", relay_route)
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let config = Config::from_env()?;

    if config.channel_access_token.is_none() {
        error!("LINE_CHANNEL_ACCESS_TOKEN is not set, every relay request will fail");
    }
    if config.api_key.is_none() {
        warn!("RELAY_API_KEY is not set, relay routes are open");
    }
    info!("Push endpoint: {}", config.push_endpoint);
    info!("Upstream timeout: {:?}", config.upstream_timeout);

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config)?);

    info!("Starting server on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
