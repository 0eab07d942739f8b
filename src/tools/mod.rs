//! Tool subsystem for agent-callable capabilities.
//!
//! Each tool implements the [`Tool`] trait defined in [`traits`], which
//! requires a name, description, JSON parameter schema, and an async
//! `execute` method returning a structured [`ToolResult`].
//!
//! [`default_tools`] assembles the gardening registry: manual lookup, garden
//! memory, seasonal context, web search, page visiting and `final_answer`.

pub mod final_answer;
pub mod garden_memory;
pub mod gardening_manual;
pub mod seasonal_context;
pub mod traits;
pub mod visit_webpage;
pub mod web_search;

pub use final_answer::{FinalAnswerTool, FINAL_ANSWER_TOOL};
pub use garden_memory::GardenMemoryTool;
pub use gardening_manual::GardeningManualTool;
pub use seasonal_context::SeasonalContextTool;
pub use traits::{Tool, ToolResult, ToolSpec};
pub use visit_webpage::VisitWebpageTool;
pub use web_search::WebSearchTool;

use crate::config::Config;
use crate::memory::GardenMemory;
use std::sync::Arc;

/// Create the default tool registry (6 tools).
pub fn default_tools(config: &Config, memory: Arc<GardenMemory>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GardeningManualTool::new(config.data.plants_path.clone())),
        Box::new(SeasonalContextTool),
        Box::new(WebSearchTool::new(
            config.search.max_results,
            config.search.timeout_secs,
        )),
        Box::new(VisitWebpageTool::new(config.search.timeout_secs)),
        Box::new(GardenMemoryTool::new(memory)),
        Box::new(FinalAnswerTool),
    ]
}
