//! Browser chat served from a single embedded page.
//!
//! Routes:
//! - `GET  /`           : the chat page
//! - `POST /api/message`: `{message, reset_history}` → `{response}`
//!
//! No API key is required; bind to localhost unless the UI is meant to be shared.

use super::{sprout_error, DESCRIPTION, EXAMPLES, TITLE};
use crate::agent::{Agent, AgentInput, AgentOrchestrator};
use crate::config::Config;
use crate::gateway::MAX_BODY_BYTES;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

const PAGE_TEMPLATE: &str = include_str!("index.html");

#[derive(Clone)]
pub struct UiState {
    pub agent: Arc<dyn AgentOrchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct UiMessage {
    pub message: String,
    #[serde(default)]
    pub reset_history: bool,
}

/// Fill the page template with the banner text and example prompts.
pub fn render_page() -> String {
    let examples: String = EXAMPLES
        .iter()
        .map(|e| format!("<button class=\"example\" type=\"button\">{e}</button>"))
        .collect();
    PAGE_TEMPLATE
        .replace("{{TITLE}}", TITLE)
        .replace("{{DESCRIPTION}}", DESCRIPTION)
        .replace("{{EXAMPLES}}", &examples)
}

async fn handle_index() -> impl IntoResponse {
    Html(render_page())
}

async fn handle_message(
    State(state): State<UiState>,
    Json(body): Json<UiMessage>,
) -> impl IntoResponse {
    let response = if body.message.trim().is_empty() {
        String::new()
    } else {
        match state
            .agent
            .run(&AgentInput::new(body.message, body.reset_history))
            .await
        {
            Ok(output) => output.response,
            Err(e) => {
                tracing::error!(error = %e, "UI turn failed");
                sprout_error(&e)
            }
        }
    };
    Json(serde_json::json!({ "response": response }))
}

pub fn build_ui_router(state: UiState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/message", post(handle_message))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

/// Build the agent and serve the chat page until Ctrl-C.
pub async fn run_ui(host: &str, port: u16, config: Config) -> Result<()> {
    let agent: Arc<dyn AgentOrchestrator> = Arc::new(Agent::from_config(&config).await?);
    let app = build_ui_router(UiState { agent });

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind UI to {host}:{port}"))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Chat UI listening");
    println!("🌱 Open http://{addr}/ in your browser");

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::gateway::shutdown_signal())
        .await
        .context("UI server error")
}
