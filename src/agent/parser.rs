//! Parsing of model replies into tool calls.
//!
//! The model is asked to end each reply with
//!
//! ```text
//! Action:
//! {"name": "<tool>", "arguments": {...}}
//! ```
//!
//! Anything without an `Action:` marker is taken as a plain-text answer.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    Action(ToolCall),
    Answer(String),
    /// An `Action:` marker was present but its payload could not be read.
    Malformed(String),
}

#[derive(Deserialize)]
struct RawAction {
    #[serde(alias = "tool", alias = "tool_name")]
    name: String,
    #[serde(default, alias = "args", alias = "parameters", alias = "action_input")]
    arguments: serde_json::Value,
}

const ACTION_MARKER: &str = "Action:";

pub fn parse_model_output(text: &str) -> ModelTurn {
    let Some(pos) = text.rfind(ACTION_MARKER) else {
        return ModelTurn::Answer(strip_answer_prefix(text));
    };
    let payload = &text[pos + ACTION_MARKER.len()..];
    let Some(start) = payload.find('{') else {
        return ModelTurn::Malformed("expected a JSON object after 'Action:'".into());
    };

    // Read exactly one JSON value; ignore trailing fences or chatter.
    let mut stream =
        serde_json::Deserializer::from_str(&payload[start..]).into_iter::<RawAction>();
    match stream.next() {
        Some(Ok(raw)) => ModelTurn::Action(ToolCall {
            name: raw.name.trim().to_string(),
            arguments: normalize_arguments(raw.arguments),
        }),
        Some(Err(e)) => ModelTurn::Malformed(format!("invalid action JSON: {e}")),
        None => ModelTurn::Malformed("empty action".into()),
    }
}

/// Arguments sometimes arrive JSON-encoded as a string, or missing.
fn normalize_arguments(arguments: serde_json::Value) -> serde_json::Value {
    match arguments {
        serde_json::Value::Null => serde_json::json!({}),
        serde_json::Value::String(s) => serde_json::from_str(&s)
            .ok()
            .filter(serde_json::Value::is_object)
            .unwrap_or_else(|| serde_json::json!({ "input": s })),
        other => other,
    }
}

fn strip_answer_prefix(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("Final Answer:")
        .map_or(trimmed, str::trim_start)
        .to_string()
}
