use super::parser::{parse_model_output, ModelTurn, ToolCall};
use super::prompt::{build_system_prompt, render_custom_prompt};
use super::traits::{AgentInput, AgentOrchestrator, AgentOutput};
use crate::config::Config;
use crate::memory::GardenMemory;
use crate::providers::{self, ChatMessage, GenerationOptions, Provider};
use crate::tools::{self, final_answer::render_answer, Tool, FINAL_ANSWER_TOOL};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

const MAX_STEPS_NUDGE: &str = "You have reached the maximum number of steps. \
Answer the original question now in plain text, without calling any tool.";

/// The gardening agent: a model, its tools, and one running conversation.
///
/// Turns are serialized through the history lock, so concurrent callers
/// queue rather than interleave.
pub struct Agent {
    provider: Box<dyn Provider>,
    tools: Vec<Box<dyn Tool>>,
    options: GenerationOptions,
    system_prompt: String,
    max_steps: usize,
    max_history_messages: usize,
    history: Mutex<Vec<ChatMessage>>,
}

pub struct AgentBuilder {
    provider: Option<Box<dyn Provider>>,
    tools: Vec<Box<dyn Tool>>,
    options: GenerationOptions,
    system_prompt: Option<String>,
    max_steps: usize,
    max_history_messages: usize,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Vec::new(),
            options: GenerationOptions::default(),
            system_prompt: None,
            max_steps: 5,
            max_history_messages: 40,
        }
    }

    pub fn provider(mut self, provider: Box<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tools(mut self, tools: Vec<Box<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps.max(1);
        self
    }

    pub fn max_history_messages(mut self, max: usize) -> Self {
        self.max_history_messages = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| anyhow::anyhow!("agent requires a provider"))?;
        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| build_system_prompt(&self.tools));
        Ok(Agent {
            provider,
            tools: self.tools,
            options: self.options,
            system_prompt,
            max_steps: self.max_steps,
            max_history_messages: self.max_history_messages,
            history: Mutex::new(Vec::new()),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Wire the local model, the garden memory file and the default tools.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let memory = Arc::new(GardenMemory::new(config.data.memory_path.clone()));
        let tools = tools::default_tools(config, memory);

        let mut builder = Agent::builder()
            .provider(providers::create_provider(config))
            .options(providers::generation_options(config))
            .max_steps(config.agent.max_steps)
            .max_history_messages(config.agent.max_history_messages);

        if let Some(path) = &config.agent.system_prompt_path {
            let template = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt {}", path.display()))?;
            builder = builder.system_prompt(render_custom_prompt(&template, &tools));
        }

        builder.tools(tools).build()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    /// Run one user turn. `reset` clears the conversation first.
    pub async fn run(&self, message: &str, reset: bool) -> Result<String> {
        self.run_turn(message, reset).await.map(|out| out.response)
    }

    async fn run_turn(&self, message: &str, reset: bool) -> Result<AgentOutput> {
        let mut history = self.history.lock().await;
        if reset {
            history.clear();
        }
        history.push(ChatMessage::user(message));

        let mut tool_calls_made = 0u32;
        for step in 1..=self.max_steps {
            let reply = self.generate(&history, None).await?;
            let text = reply.content.trim().to_string();

            match parse_model_output(&text) {
                ModelTurn::Answer(answer) => {
                    tracing::debug!(step, "Model answered without a tool");
                    return Ok(self.finish(&mut history, answer, tool_calls_made, step));
                }
                ModelTurn::Action(call) if call.name == FINAL_ANSWER_TOOL => {
                    let answer = render_answer(
                        call.arguments.get("answer").unwrap_or(&serde_json::Value::Null),
                    );
                    return Ok(self.finish(&mut history, answer, tool_calls_made, step));
                }
                ModelTurn::Action(call) => {
                    tool_calls_made += 1;
                    let observation = self.execute_tool(&call, step).await;
                    history.push(ChatMessage::assistant(text));
                    history.push(ChatMessage::tool(format!("Observation: {observation}")));
                }
                ModelTurn::Malformed(reason) => {
                    tracing::warn!(step, %reason, "Unreadable action from model");
                    history.push(ChatMessage::assistant(text));
                    history.push(ChatMessage::tool(format!(
                        "Observation: Error: {reason}. Reply with a valid action block."
                    )));
                }
            }
        }

        tracing::info!(max_steps = self.max_steps, "Step limit reached; forcing a final answer");
        let reply = self
            .generate(&history, Some(ChatMessage::user(MAX_STEPS_NUDGE)))
            .await?;
        let answer = match parse_model_output(reply.content.trim()) {
            ModelTurn::Action(call) if call.name == FINAL_ANSWER_TOOL => render_answer(
                call.arguments.get("answer").unwrap_or(&serde_json::Value::Null),
            ),
            ModelTurn::Answer(answer) => answer,
            _ => reply.content.trim().to_string(),
        };
        Ok(self.finish(&mut history, answer, tool_calls_made, self.max_steps + 1))
    }

    async fn generate(
        &self,
        history: &[ChatMessage],
        extra: Option<ChatMessage>,
    ) -> Result<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(history.iter().cloned());
        messages.extend(extra);
        self.provider.generate(&messages, &self.options).await
    }

    async fn execute_tool(&self, call: &ToolCall, step: usize) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            tracing::warn!(tool = %call.name, step, "Model called an unknown tool");
            return format!(
                "Error: Unknown tool '{}'. Available tools: {}",
                call.name,
                self.tool_names().join(", ")
            );
        };

        tracing::info!(tool = %call.name, step, "Tool call");
        match tool.execute(call.arguments.clone()).await {
            Ok(result) => result.observation(),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool failed");
                format!("Error: {e}")
            }
        }
    }

    fn finish(
        &self,
        history: &mut Vec<ChatMessage>,
        answer: String,
        tool_calls_made: u32,
        steps: usize,
    ) -> AgentOutput {
        history.push(ChatMessage::assistant(answer.clone()));
        if history.len() > self.max_history_messages {
            let excess = history.len() - self.max_history_messages;
            history.drain(..excess);
        }
        AgentOutput {
            response: answer,
            tool_calls_made,
            steps: u32::try_from(steps).unwrap_or(u32::MAX),
        }
    }
}

#[async_trait]
impl AgentOrchestrator for Agent {
    async fn run(&self, input: &AgentInput) -> Result<AgentOutput> {
        self.run_turn(&input.message, input.reset_history).await
    }

    fn name(&self) -> &str {
        "greenthumb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FinalAnswerTool, ToolResult};
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Replays canned replies and records every conversation it was sent.
    struct ScriptedProvider {
        replies: SyncMutex<VecDeque<anyhow::Result<String>>>,
        seen: Arc<SyncMutex<Vec<Vec<ChatMessage>>>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<&str>) -> (Self, Arc<SyncMutex<Vec<Vec<ChatMessage>>>>) {
            let seen = Arc::new(SyncMutex::new(Vec::new()));
            (
                Self {
                    replies: SyncMutex::new(
                        replies.into_iter().map(|r| Ok(r.to_string())).collect(),
                    ),
                    seen: seen.clone(),
                },
                seen,
            )
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn generate(
            &self,
            messages: &[ChatMessage],
            _options: &GenerationOptions,
        ) -> Result<ChatMessage> {
            self.seen.lock().push(messages.to_vec());
            let reply = self
                .replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))?;
            Ok(ChatMessage::assistant(reply))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes its text argument."
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(&self, args: serde_json::Value) -> Result<ToolResult> {
            let text = args["text"].as_str().unwrap_or_default();
            if text == "fail" {
                anyhow::bail!("echo refused");
            }
            Ok(ToolResult::ok(format!("echo: {text}")))
        }
    }

    fn agent(replies: Vec<&str>, max_steps: usize) -> (Agent, Arc<SyncMutex<Vec<Vec<ChatMessage>>>>) {
        let (provider, seen) = ScriptedProvider::new(replies);
        let agent = Agent::builder()
            .provider(Box::new(provider))
            .tools(vec![Box::new(EchoTool), Box::new(FinalAnswerTool)])
            .max_steps(max_steps)
            .build()
            .unwrap();
        (agent, seen)
    }

    #[tokio::test]
    async fn tool_call_then_final_answer() {
        let (agent, seen) = agent(
            vec![
                "Thought: echo it\nAction:\n{\"name\": \"echo\", \"arguments\": {\"text\": \"ficus\"}}",
                "Action:\n{\"name\": \"final_answer\", \"arguments\": {\"answer\": \"Water weekly.\"}}",
            ],
            5,
        );

        let output = AgentOrchestrator::run(&agent, &AgentInput::new("How often?", false))
            .await
            .unwrap();
        assert_eq!(output.response, "Water weekly.");
        assert_eq!(output.tool_calls_made, 1);
        assert_eq!(output.steps, 2);

        let calls = seen.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][0].role, "system");
        let last = calls[1].last().unwrap();
        assert_eq!(last.role, "tool");
        assert_eq!(last.content, "Observation: echo: ficus");
    }

    #[tokio::test]
    async fn plain_text_reply_is_the_answer() {
        let (agent, _) = agent(vec!["Aloe vera is toxic to cats."], 5);
        let answer = agent.run("Is aloe toxic to cats?", false).await.unwrap();
        assert_eq!(answer, "Aloe vera is toxic to cats.");
        let history = agent.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], ChatMessage::assistant("Aloe vera is toxic to cats."));
    }

    #[tokio::test]
    async fn history_carries_over_unless_reset() {
        let (agent, seen) = agent(vec!["first", "second", "third"], 5);
        agent.run("one", false).await.unwrap();
        agent.run("two", false).await.unwrap();
        assert_eq!(seen.lock()[1].len(), 4); // system + user + assistant + user

        agent.run("three", true).await.unwrap();
        let last_call = seen.lock()[2].clone();
        assert_eq!(last_call.len(), 2);
        assert_eq!(last_call[1], ChatMessage::user("three"));
    }

    #[tokio::test]
    async fn tool_errors_and_unknown_tools_become_observations() {
        let (agent, seen) = agent(
            vec![
                "Action: {\"name\": \"echo\", \"arguments\": {\"text\": \"fail\"}}",
                "Action: {\"name\": \"compost\", \"arguments\": {}}",
                "Action: not json",
                "done",
            ],
            5,
        );
        assert_eq!(agent.run("go", false).await.unwrap(), "done");

        let calls = seen.lock();
        let observations: Vec<String> = calls[3]
            .iter()
            .filter(|m| m.role == "tool")
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(observations[0], "Observation: Error: echo refused");
        assert!(observations[1].starts_with("Observation: Error: Unknown tool 'compost'"));
        assert!(observations[2].contains("expected a JSON object"));
    }

    #[tokio::test]
    async fn step_limit_forces_a_final_answer() {
        let action = "Action: {\"name\": \"echo\", \"arguments\": {\"text\": \"again\"}}";
        let (agent, seen) = agent(vec![action, action, "Here is my best answer."], 2);
        let output = AgentOrchestrator::run(&agent, &AgentInput::new("loop", false))
            .await
            .unwrap();
        assert_eq!(output.response, "Here is my best answer.");
        assert_eq!(output.tool_calls_made, 2);

        let calls = seen.lock();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].last().unwrap().content, MAX_STEPS_NUDGE);
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let (agent, _) = agent(vec![], 5);
        let err = agent.run("hello", false).await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }

    #[tokio::test]
    async fn history_is_trimmed_to_limit() {
        let (provider, _) = ScriptedProvider::new(vec!["a", "b", "c"]);
        let agent = Agent::builder()
            .provider(Box::new(provider))
            .max_history_messages(3)
            .build()
            .unwrap();
        for msg in ["1", "2", "3"] {
            agent.run(msg, false).await.unwrap();
        }
        let history = agent.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[2], ChatMessage::assistant("c"));
    }

    #[test]
    fn builder_requires_provider() {
        assert!(Agent::builder().build().is_err());
    }
}
