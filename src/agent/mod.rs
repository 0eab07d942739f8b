#[allow(clippy::module_inception)]
pub mod agent;
pub mod parser;
pub mod prompt;
pub mod traits;

pub use agent::{Agent, AgentBuilder};
pub use traits::{AgentInput, AgentOrchestrator, AgentOutput};
