pub mod schema;

#[allow(unused_imports)]
pub use schema::{AgentConfig, Config, DataConfig, GatewayConfig, SearchConfig, UiConfig};
