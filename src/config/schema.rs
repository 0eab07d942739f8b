use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

// ── Top-level config ──────────────────────────────────────────────

/// Top-level GreenThumb configuration, loaded from `config.toml`.
///
/// Resolution order: `--config-dir` / `GREENTHUMB_CONFIG_DIR` → `~/.greenthumb/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Base URL of the local model server (llama.cpp server, Ollama, vLLM...).
    #[serde(default = "default_model_url")]
    pub model_url: String,
    /// Model identifier sent with each completion request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Optional bearer key for the model server. Most local servers need none.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sampling temperature (0.0–2.0). Default: `0.7`.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens generated per model call. Default: `1024`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Extra stop sequences appended to the built-in ChatML ones.
    #[serde(default)]
    pub stop_sequences: Vec<String>,

    /// Agent loop settings (`[agent]`).
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP API settings (`[gateway]`).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Browser chat settings (`[ui]`).
    #[serde(default)]
    pub ui: UiConfig,

    /// Dataset and memory file locations (`[data]`).
    #[serde(default)]
    pub data: DataConfig,

    /// Web search tool settings (`[search]`).
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_model_url() -> String {
    "http://127.0.0.1:8080/v1".into()
}

fn default_model() -> String {
    "qwen2.5-7b-instruct-q2_k".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

/// Agent loop configuration (`[agent]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per user turn before a forced final answer. Default: `5`.
    #[serde(default = "default_agent_max_steps")]
    pub max_steps: usize,
    /// Maximum conversation history messages retained between turns. Default: `40`.
    #[serde(default = "default_agent_max_history_messages")]
    pub max_history_messages: usize,
    /// Optional file replacing the built-in system prompt.
    /// `{{tool_descriptions}}` inside it is replaced with the tool list.
    #[serde(default)]
    pub system_prompt_path: Option<PathBuf>,
}

fn default_agent_max_steps() -> usize {
    5
}

fn default_agent_max_history_messages() -> usize {
    40
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_agent_max_steps(),
            max_history_messages: default_agent_max_history_messages(),
            system_prompt_path: None,
        }
    }
}

// ── Gateway ──────────────────────────────────────────────────────

/// HTTP API configuration (`[gateway]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 0.0.0.0)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Static key expected in the `X-API-KEY` header.
    /// Overridden by `GREENTHUMB_API_KEY` or `API_KEY` env vars.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout, covering the whole agent turn.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_host() -> String {
    "0.0.0.0".into()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Browser chat configuration (`[ui]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_ui_host")]
    pub host: String,
    #[serde(default = "default_ui_port")]
    pub port: u16,
}

fn default_ui_host() -> String {
    "127.0.0.1".into()
}

fn default_ui_port() -> u16 {
    7860
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            host: default_ui_host(),
            port: default_ui_port(),
        }
    }
}

/// File locations (`[data]` section). Relative paths resolve against the
/// process working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_plants_path")]
    pub plants_path: PathBuf,
    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,
}

fn default_plants_path() -> PathBuf {
    PathBuf::from("data/plants_data.json")
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("garden_memory.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            plants_path: default_plants_path(),
            memory_path: default_memory_path(),
        }
    }
}

/// Web search configuration (`[search]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_max_results() -> usize {
    10
}

fn default_search_timeout_secs() -> u64 {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_search_max_results(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            model_url: default_model_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            stop_sequences: Vec::new(),
            agent: AgentConfig::default(),
            gateway: GatewayConfig::default(),
            ui: UiConfig::default(),
            data: DataConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

fn default_config_dir() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".greenthumb"))
}

fn resolve_config_dir() -> Result<PathBuf> {
    if let Ok(custom) = std::env::var("GREENTHUMB_CONFIG_DIR") {
        let custom = custom.trim();
        if !custom.is_empty() {
            return Ok(PathBuf::from(custom));
        }
    }
    default_config_dir()
}

impl Config {
    pub async fn load_or_init() -> Result<Self> {
        let config_dir = resolve_config_dir()?;
        let config_path = config_dir.join("config.toml");

        fs::create_dir_all(&config_dir).await.with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;

        let initialized = !config_path.exists();
        let mut config = if initialized {
            let mut config = Config::default();
            config.config_path = config_path.clone();
            config.save().await?;

            // Restrict permissions on newly created config file (may contain API keys)
            #[cfg(unix)]
            {
                use std::{fs::Permissions, os::unix::fs::PermissionsExt};
                let _ = fs::set_permissions(&config_path, Permissions::from_mode(0o600)).await;
            }
            config
        } else {
            Self::load_from(&config_path).await?
        };

        config.apply_env_overrides();
        config.validate()?;
        tracing::info!(
            path = %config.config_path.display(),
            initialized,
            "Config loaded"
        );
        Ok(config)
    }

    /// Parse a config file without touching env overrides.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str)
            .await
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;
        Ok(())
    }

    /// Validate configuration values that would cause runtime failures.
    pub fn validate(&self) -> Result<()> {
        if self.model_url.trim().is_empty() {
            anyhow::bail!("model_url must not be empty");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!("temperature must be between 0.0 and 2.0");
        }
        if self.max_tokens == 0 {
            anyhow::bail!("max_tokens must be greater than 0");
        }
        if self.agent.max_steps == 0 {
            anyhow::bail!("agent.max_steps must be greater than 0");
        }
        if self.gateway.host.trim().is_empty() {
            anyhow::bail!("gateway.host must not be empty");
        }
        if self.ui.host.trim().is_empty() {
            anyhow::bail!("ui.host must not be empty");
        }
        Ok(())
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env(&["GREENTHUMB_MODEL_URL"]) {
            self.model_url = url;
        }

        if let Some(model) = non_empty_env(&["GREENTHUMB_MODEL"]) {
            self.model = model;
        }

        if let Some(temp) = non_empty_env(&["GREENTHUMB_TEMPERATURE"]) {
            if let Ok(temp) = temp.parse::<f64>() {
                if (0.0..=2.0).contains(&temp) {
                    self.temperature = temp;
                }
            }
        }

        // Gateway key: GREENTHUMB_API_KEY or API_KEY (generic)
        if let Some(key) = non_empty_env(&["GREENTHUMB_API_KEY", "API_KEY"]) {
            self.gateway.api_key = Some(key);
        }

        if let Some(host) = non_empty_env(&["GREENTHUMB_GATEWAY_HOST", "HOST"]) {
            self.gateway.host = host;
        }

        if let Some(port) = non_empty_env(&["GREENTHUMB_GATEWAY_PORT", "PORT"]) {
            if let Ok(port) = port.parse::<u16>() {
                self.gateway.port = port;
            }
        }

        if let Some(path) = non_empty_env(&["GREENTHUMB_MEMORY_PATH"]) {
            self.data.memory_path = PathBuf::from(path);
        }

        if let Some(path) = non_empty_env(&["GREENTHUMB_PLANTS_PATH"]) {
            self.data.plants_path = PathBuf::from(path);
        }
    }
}

/// First non-empty value among the given env vars, in order.
fn non_empty_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
