use super::traits::{required_str, Tool, ToolResult};
use crate::knowledge::GardeningManual;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Plant care lookup against the bundled gardening manual.
///
/// The dataset is loaded on first use and cached for the process lifetime.
/// A failed load is not cached, so a later call retries.
pub struct GardeningManualTool {
    path: PathBuf,
    manual: OnceCell<Arc<GardeningManual>>,
}

impl GardeningManualTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            manual: OnceCell::new(),
        }
    }

    /// Build the tool around an already loaded manual.
    pub fn with_manual(manual: GardeningManual) -> Self {
        Self {
            path: PathBuf::new(),
            manual: OnceCell::new_with(Some(Arc::new(manual))),
        }
    }

    async fn manual(&self) -> Result<Arc<GardeningManual>, crate::knowledge::ManualError> {
        self.manual
            .get_or_try_init(|| async {
                let path = self.path.clone();
                tokio::task::spawn_blocking(move || GardeningManual::load(&path))
                    .await
                    .unwrap_or_else(|join_err| {
                        Err(crate::knowledge::ManualError::Io {
                            path: self.path.clone(),
                            source: std::io::Error::other(join_err),
                        })
                    })
                    .map(Arc::new)
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl Tool for GardeningManualTool {
    fn name(&self) -> &str {
        "gardening_manual"
    }

    fn description(&self) -> &str {
        "Retrieves specific care instructions for plants. Handles ONLY plant names as input."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The plant name to search for."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let query = required_str(&args, "query")?;
        let answer = match self.manual().await {
            Ok(manual) => manual.answer(query),
            Err(e) => Err(e),
        };
        match answer {
            Ok(text) => Ok(ToolResult::ok(text)),
            Err(e) => {
                tracing::warn!(error = %e, "Gardening manual unavailable");
                Ok(ToolResult::ok(e.to_string()))
            }
        }
    }
}
