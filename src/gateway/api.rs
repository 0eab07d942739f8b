//! `/chat` and `/health` handlers.
//!
//! `/chat` requires the static key in the `X-API-KEY` header.

use super::AppState;
use crate::agent::AgentInput;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub reset_history: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Every failure is reported as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    MissingKey,
    #[error("Could not validate credentials")]
    InvalidKey,
    #[error("Message cannot be empty.")]
    EmptyMessage,
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },
    #[error("{0}")]
    Agent(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingKey | Self::InvalidKey => StatusCode::FORBIDDEN,
            Self::EmptyMessage => StatusCode::BAD_REQUEST,
            Self::InvalidBody { status, .. } => *status,
            Self::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

/// Check the `X-API-KEY` header against the configured key.
/// With no key configured every request is refused.
fn require_api_key(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingKey)?;
    let Some(expected) = state.api_key.as_deref() else {
        tracing::warn!("Rejected /chat: no API key configured");
        return Err(ApiError::InvalidKey);
    };
    if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
        Ok(())
    } else {
        tracing::warn!("Rejected /chat: invalid API key");
        Err(ApiError::InvalidKey)
    }
}

/// POST /chat: run one agent turn
pub async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    require_api_key(&state, &headers)?;
    let Json(request) = body.map_err(|e| ApiError::InvalidBody {
        status: e.status(),
        message: e.body_text(),
    })?;

    if request.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let input = AgentInput::new(request.message, request.reset_history);
    match state.agent.run(&input).await {
        Ok(output) => {
            tracing::info!(
                steps = output.steps,
                tool_calls = output.tool_calls_made,
                reset = input.reset_history,
                "Chat turn completed"
            );
            Ok(Json(ChatResponse {
                response: output.response,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat turn failed");
            Err(ApiError::Agent(e.to_string()))
        }
    }
}

/// GET /health: only reachable once the agent is built
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ready" }))
}
