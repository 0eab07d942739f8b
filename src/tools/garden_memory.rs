use super::traits::{optional_str, Tool, ToolResult};
use crate::memory::GardenMemory;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Lets the agent save and recall facts about the user's garden.
pub struct GardenMemoryTool {
    memory: Arc<GardenMemory>,
}

impl GardenMemoryTool {
    pub fn new(memory: Arc<GardenMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for GardenMemoryTool {
    fn name(&self) -> &str {
        "garden_memory"
    }

    fn description(&self) -> &str {
        "Maintains persistent memory of the user's garden. Use 'save' to update specific keys \
         (location, hardiness_zone, plants) and 'retrieve' to see all stored data."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["save", "retrieve"],
                    "description": "The action to perform: 'save' to add/update info, or 'retrieve' to read it."
                },
                "key": {
                    "type": "string",
                    "description": "The specific category (e.g., 'location', 'plants', 'zone'). Required for 'save'."
                },
                "value": {
                    "description": "The information to store. Can be a string, list, or number. Required for 'save'."
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let action = optional_str(&args, "action").unwrap_or_default();
        let memory = self.memory.clone();

        match action {
            "save" => {
                let key = optional_str(&args, "key").unwrap_or_default().to_string();
                let value = args.get("value").cloned().unwrap_or(serde_json::Value::Null);
                if key.is_empty() || value.is_null() {
                    return Ok(ToolResult::ok(
                        "Error: Both 'key' and 'value' are required when saving information.",
                    ));
                }
                let message =
                    tokio::task::spawn_blocking(move || memory.save(&key, value)).await??;
                Ok(ToolResult::ok(message))
            }
            "retrieve" => {
                let summary = tokio::task::spawn_blocking(move || memory.summary()).await??;
                Ok(ToolResult::ok(summary))
            }
            _ => Ok(ToolResult::ok("Invalid action. Use 'save' or 'retrieve'.")),
        }
    }
}
