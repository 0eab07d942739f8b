//! Agent orchestration seam shared by the HTTP API and the chat front ends.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Top-level "brain" interface.
///
/// Every entry point forwards user text to one shared implementation of this
/// trait, so all front ends see the same conversation.
#[async_trait]
pub trait AgentOrchestrator: Send + Sync {
    /// Run one user turn and return the final response.
    async fn run(&self, input: &AgentInput) -> Result<AgentOutput>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInput {
    pub message: String,
    /// Forget the previous conversation before this turn.
    #[serde(default)]
    pub reset_history: bool,
}

impl AgentInput {
    pub fn new(message: impl Into<String>, reset_history: bool) -> Self {
        Self {
            message: message.into(),
            reset_history,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutput {
    pub response: String,
    pub tool_calls_made: u32,
    pub steps: u32,
}
