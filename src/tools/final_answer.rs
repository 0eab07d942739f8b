use super::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;

pub const FINAL_ANSWER_TOOL: &str = "final_answer";

/// Ends the agent turn with the given answer.
pub struct FinalAnswerTool;

/// Render an answer value: strings verbatim, anything else as JSON.
pub fn render_answer(answer: &serde_json::Value) -> String {
    match answer {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Tool for FinalAnswerTool {
    fn name(&self) -> &str {
        FINAL_ANSWER_TOOL
    }

    fn description(&self) -> &str {
        "Provides a final answer to the given problem."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "answer": {
                    "description": "The final answer to the problem"
                }
            },
            "required": ["answer"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let answer = args.get("answer").unwrap_or(&serde_json::Value::Null);
        Ok(ToolResult::ok(render_answer(answer)))
    }
}
