//! HTTP API gateway.
//!
//! Routes:
//! - `POST /chat`  : forward a message to the shared agent (API key required)
//! - `GET  /health`: readiness check

pub mod api;

use crate::agent::{Agent, AgentOrchestrator};
use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgentOrchestrator>,
    pub api_key: Option<Arc<str>>,
}

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/chat", post(api::handle_chat))
        .route("/health", get(api::handle_health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the agent, bind, and serve until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let agent: Arc<dyn AgentOrchestrator> = Arc::new(Agent::from_config(&config).await?);

    let api_key = config
        .gateway
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(Arc::<str>::from);
    match &api_key {
        Some(key) => tracing::info!(api_key = %crate::security::redact(key), "API key configured"),
        None => tracing::warn!("No API key configured; every /chat request will be rejected. Set API_KEY."),
    }

    let state = AppState { agent, api_key };
    let app = build_router(
        state,
        Duration::from_secs(config.gateway.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind gateway to {host}:{port}"))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")
}

pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
