//! Local model adapter over the OpenAI-compatible `/v1/completions` API.
//!
//! llama.cpp's server, Ollama and vLLM all accept a raw prompt on this
//! endpoint. The conversation is flattened into a single ChatML prompt so the
//! model sees exactly the template it was instruction-tuned on.

use crate::providers::traits::{ChatMessage, GenerationOptions, Provider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Stop sequences always sent to the model.
pub const DEFAULT_STOP_SEQUENCES: [&str; 4] = ["<|im_end|>", "Observation:", "<|im_start|>", "```\n"];

/// Flatten a conversation into a ChatML prompt ending with an open assistant turn.
pub fn format_chatml(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for msg in messages {
        prompt.push_str("<|im_start|>");
        prompt.push_str(&msg.role.to_uppercase());
        prompt.push('\n');
        prompt.push_str(&msg.content);
        prompt.push_str("<|im_end|>\n");
    }
    prompt.push_str("<|im_start|>ASSISTANT\n");
    prompt
}

/// Built-in stop sequences followed by caller-supplied ones.
pub fn merge_stop_sequences(extra: &[String]) -> Vec<String> {
    DEFAULT_STOP_SEQUENCES
        .iter()
        .map(|s| (*s).to_string())
        .chain(extra.iter().cloned())
        .collect()
}

/// A provider that sends raw prompts to a local completions endpoint.
pub struct LocalCompletionProvider {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    client: Client,
}

impl LocalCompletionProvider {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(600))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Build the full URL for completions, detecting if base_url already includes the path.
    fn completions_url(&self) -> String {
        let has_full_endpoint = reqwest::Url::parse(&self.base_url)
            .map(|url| url.path().trim_end_matches('/').ends_with("/completions"))
            .unwrap_or_else(|_| self.base_url.ends_with("/completions"));

        if has_full_endpoint {
            self.base_url.clone()
        } else {
            format!("{}/completions", self.base_url)
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f64,
    stop: Vec<String>,
    echo: bool,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

fn extract_text(response: CompletionResponse) -> anyhow::Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or_else(|| anyhow::anyhow!("No choices returned by local model"))
}

#[async_trait]
impl Provider for LocalCompletionProvider {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> anyhow::Result<ChatMessage> {
        let request = CompletionRequest {
            model: &options.model,
            prompt: format_chatml(messages),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stop: merge_stop_sequences(&options.stop),
            echo: false,
            stream: false,
        };

        let url = self.completions_url();
        tracing::debug!(%url, prompt_chars = request.prompt.len(), "Calling local model");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(super::api_error(self.name(), response).await);
        }

        let body: CompletionResponse = response.json().await?;
        Ok(ChatMessage::assistant(extract_text(body)?))
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chatml_upper_cases_roles_and_opens_assistant_turn() {
        let prompt = format_chatml(&[
            ChatMessage::system("You are a gardener."),
            ChatMessage::user("Water my ficus?"),
        ]);
        assert_eq!(
            prompt,
            "<|im_start|>SYSTEM\nYou are a gardener.<|im_end|>\n\
             <|im_start|>USER\nWater my ficus?<|im_end|>\n\
             <|im_start|>ASSISTANT\n"
        );
    }

    #[test]
    fn chatml_of_empty_conversation_is_just_the_assistant_header() {
        assert_eq!(format_chatml(&[]), "<|im_start|>ASSISTANT\n");
    }

    #[test]
    fn stop_sequences_keep_defaults_first() {
        let stops = merge_stop_sequences(&["Final:".to_string()]);
        assert_eq!(stops.len(), 5);
        assert_eq!(stops[0], "<|im_end|>");
        assert_eq!(stops[1], "Observation:");
        assert_eq!(stops[3], "```\n");
        assert_eq!(stops[4], "Final:");
    }

    #[test]
    fn completions_url_appends_path() {
        let p = LocalCompletionProvider::new("http://localhost:8080/v1/", None);
        assert_eq!(p.completions_url(), "http://localhost:8080/v1/completions");
    }

    #[test]
    fn completions_url_keeps_explicit_endpoint() {
        let p = LocalCompletionProvider::new("http://localhost:11434/v1/completions", None);
        assert_eq!(p.completions_url(), "http://localhost:11434/v1/completions");
    }

    #[test]
    fn blank_api_key_is_dropped() {
        let p = LocalCompletionProvider::new("http://localhost:8080", Some("   "));
        assert!(p.api_key.is_none());
    }

    #[test]
    fn extract_text_takes_first_choice() {
        let body: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"text":"Water weekly."},{"text":"no"}]}"#)
                .unwrap();
        assert_eq!(extract_text(body).unwrap(), "Water weekly.");
    }

    #[test]
    fn extract_text_errors_without_choices() {
        let body: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_text(body).is_err());
    }

    #[test]
    fn request_serializes_stop_and_prompt() {
        let request = CompletionRequest {
            model: "qwen",
            prompt: "hi".into(),
            max_tokens: 16,
            temperature: 0.7,
            stop: merge_stop_sequences(&[]),
            echo: false,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "hi");
        assert_eq!(json["stop"].as_array().unwrap().len(), 4);
        assert_eq!(json["echo"], false);
    }
}
