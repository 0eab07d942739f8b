use crate::tools::Tool;
use std::fmt::Write;

/// Placeholder replaced by the tool list in custom prompt files.
pub const TOOL_DESCRIPTIONS_PLACEHOLDER: &str = "{{tool_descriptions}}";

const PERSONA: &str = "You are GreenThumb, a friendly and knowledgeable plant expert. \
You remember the user's garden and provide practical botanical advice: watering, soil, \
light, seasonal timing, pests, and toxicity to pets.";

const ACTION_FORMAT: &str = r#"To use a tool, write one short thought and then an action block, and stop:
Thought: <what you need and why>
Action:
{"name": "<tool name>", "arguments": {<arguments as JSON>}}

Do not wrap the action in code fences. After each action you will receive an
Observation with the tool's output. Call exactly one tool per reply.
When you can answer, call final_answer:
Action:
{"name": "final_answer", "arguments": {"answer": "<your answer to the user>"}}

Guidelines:
- Retrieve garden_memory when the user's location, zone or plants matter, and save new facts the user tells you.
- gardening_manual accepts plant names only.
- Use seasonal_context before giving timing advice.
- Use web_search and visit_webpage only when the manual has nothing useful."#;

/// One line per tool plus its argument schema.
pub fn render_tool_descriptions(tools: &[Box<dyn Tool>]) -> String {
    let mut out = String::new();
    for tool in tools {
        let _ = writeln!(out, "- {}: {}", tool.name(), tool.description());
        let _ = writeln!(
            out,
            "  Arguments: {}",
            tool.parameters_schema()
                .get("properties")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}))
        );
    }
    out.trim_end().to_string()
}

/// The built-in system prompt.
pub fn build_system_prompt(tools: &[Box<dyn Tool>]) -> String {
    format!(
        "{PERSONA}\n\nYou can use these tools:\n{}\n\n{ACTION_FORMAT}",
        render_tool_descriptions(tools)
    )
}

/// Fill a custom prompt template. Templates without the placeholder get the
/// tool list appended so the model still knows what it can call.
pub fn render_custom_prompt(template: &str, tools: &[Box<dyn Tool>]) -> String {
    let descriptions = render_tool_descriptions(tools);
    if template.contains(TOOL_DESCRIPTIONS_PLACEHOLDER) {
        template.replace(TOOL_DESCRIPTIONS_PLACEHOLDER, &descriptions)
    } else {
        format!("{}\n\nYou can use these tools:\n{descriptions}", template.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FinalAnswerTool, SeasonalContextTool};

    fn tools() -> Vec<Box<dyn Tool>> {
        vec![Box::new(SeasonalContextTool), Box::new(FinalAnswerTool)]
    }

    #[test]
    fn system_prompt_lists_every_tool() {
        let prompt = build_system_prompt(&tools());
        assert!(prompt.starts_with("You are GreenThumb"));
        assert!(prompt.contains("- seasonal_context: Provides the current date"));
        assert!(prompt.contains("- final_answer: Provides a final answer"));
        assert!(prompt.contains("\"hemisphere\""));
        assert!(prompt.contains("Action:"));
    }

    #[test]
    fn custom_prompt_substitutes_placeholder() {
        let prompt = render_custom_prompt("Be brief.\nTools:\n{{tool_descriptions}}\nEnd.", &tools());
        assert!(prompt.starts_with("Be brief.\nTools:\n- seasonal_context"));
        assert!(prompt.ends_with("\nEnd."));
        assert!(!prompt.contains(TOOL_DESCRIPTIONS_PLACEHOLDER));
    }

    #[test]
    fn custom_prompt_without_placeholder_appends_tools() {
        let prompt = render_custom_prompt("Be brief.\n", &tools());
        assert!(prompt.starts_with("Be brief.\n\nYou can use these tools:\n- seasonal_context"));
    }
}
