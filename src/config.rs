use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use wikihop::agent::AgentConfig;
use wikihop::llm::GatewayConfig;
use wikihop::wiki::WikipediaConfig;

/// Overrides `gateway.url` when set
const GATEWAY_URL_ENV: &str = "TENSORZERO_GATEWAY_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub gateway: GatewaySettings,
    pub agent: AgentSettings,
    pub wikipedia: WikipediaSettings,
    pub output: OutputConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub url: String,
    pub function_name: String,
    pub variant_name: Option<String>,
    pub timeout_ms: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        let defaults = GatewayConfig::default();
        Self {
            url: defaults.url,
            function_name: defaults.function_name,
            variant_name: None,
            timeout_ms: 300000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_inferences: u32,
    pub parallel_tools: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_inferences: 20,
            parallel_tools: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaSettings {
    pub api_url: String,
    pub search_limit: u32,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        let defaults = WikipediaConfig::default();
        Self {
            api_url: defaults.api_url,
            search_limit: defaults.search_limit,
            timeout_ms: 30000,
            user_agent: defaults.user_agent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub stream_delay_ms: u64,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            stream_delay_ms: 30,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub save_transcripts: bool,
    pub transcript_dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            save_transcripts: false,
            transcript_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(env!("CARGO_PKG_NAME"))
                .join("transcripts"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            gateway: GatewaySettings::default(),
            agent: AgentSettings::default(),
            wikipedia: WikipediaSettings::default(),
            output: OutputConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env(std::env::var(GATEWAY_URL_ENV).ok());
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    fn apply_env(&mut self, gateway_url: Option<String>) {
        if let Some(url) = gateway_url.filter(|u| !u.is_empty()) {
            log::info!("Using gateway url from {}: {}", GATEWAY_URL_ENV, url);
            self.gateway.url = url;
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            url: self.gateway.url.clone(),
            function_name: self.gateway.function_name.clone(),
            variant_name: self.gateway.variant_name.clone(),
            timeout: Duration::from_millis(self.gateway.timeout_ms),
        }
    }

    pub fn wikipedia_config(&self) -> WikipediaConfig {
        WikipediaConfig {
            api_url: self.wikipedia.api_url.clone(),
            search_limit: self.wikipedia.search_limit,
            timeout: Duration::from_millis(self.wikipedia.timeout_ms),
            user_agent: self.wikipedia.user_agent.clone(),
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            max_inferences: self.agent.max_inferences,
            parallel_tools: self.agent.parallel_tools,
        }
    }
}
