//! HTTP surface: shared state, route table and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use promptgate_core::config::Config;

use crate::gateway::Gateway;
use crate::routes;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub started: Instant,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            started: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = Gateway::from_config(config).context("failed to build provider adapters")?;
        Ok(Self::new(gateway))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ai", get(routes::ai_query).post(routes::ai_body))
        .route("/batch", post(routes::batch))
        .route("/api/models", get(routes::models))
        .route("/api/image", get(routes::image))
        .route("/health", get(routes::health))
        .fallback(routes::not_found)
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn run(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let models = state.gateway.registry().len();
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, models, "PromptGate listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down...");
    }
}
