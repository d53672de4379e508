use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::router::circuit::CircuitBreakerConfig;
use crate::router::RouteMode;

pub mod models;

pub const DEFAULT_ROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider_mode: ProviderMode,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub circuit: CircuitBreakerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_file_enabled")]
    pub log_file_enabled: bool,
    #[serde(default = "default_log_rotation")]
    pub log_rotation: String,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default = "default_log_file_prefix")]
    pub log_file_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_file_enabled: default_log_file_enabled(),
            log_rotation: default_log_rotation(),
            log_dir: None,
            log_file_prefix: default_log_file_prefix(),
        }
    }
}

/// Which outer backend family serves assistant requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    #[default]
    Router,
    Gateway,
    Mock,
}

/// Settings for the free-model router family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub default_mode: RouteMode,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
            default_mode: RouteMode::default(),
        }
    }
}

impl RouterConfig {
    /// Credential from config, falling back to `OPENROUTER_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| env_non_empty("OPENROUTER_API_KEY"))
    }

    pub fn resolved_base_url(&self) -> String {
        non_empty(self.base_url.clone())
            .or_else(|| env_non_empty("OPENROUTER_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_ROUTER_BASE_URL.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Settings for the hosted gateway family (one fixed model)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_gateway_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_gateway_model(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GatewayConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| env_non_empty("GATEWAY_API_KEY"))
    }

    pub fn resolved_base_url(&self) -> String {
        non_empty(self.base_url.clone())
            .or_else(|| env_non_empty("GATEWAY_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_GATEWAY_BASE_URL.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_non_empty(key: &str) -> Option<String> {
    non_empty(std::env::var(key).ok())
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3743
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_enabled() -> bool {
    true
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

fn default_log_file_prefix() -> String {
    "relay".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_gateway_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    /// Load `relay.toml` from the platform config directory, overlaid with `RELAY_*` env vars.
    pub fn load() -> Result<Self> {
        let config_dir = get_config_dir()?;
        Self::load_from(config_dir.join("relay.toml"))
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("RELAY_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Effective configuration as TOML, with credentials left out.
    pub fn render_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        redacted.router.api_key = None;
        redacted.gateway.api_key = None;

        toml::to_string_pretty(&redacted)
            .map_err(|e| RelayError::Other(format!("Failed to serialize config: {}", e)))
    }

    pub fn config_dir() -> Result<PathBuf> {
        get_config_dir()
    }

    pub fn data_dir() -> Result<PathBuf> {
        get_data_dir()
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        if let Some(log_dir) = &self.server.log_dir {
            let path = PathBuf::from(log_dir);
            std::fs::create_dir_all(&path)?;
            Ok(path)
        } else {
            let data_dir = Self::data_dir()?;
            let log_dir = data_dir.join("logs");
            std::fs::create_dir_all(&log_dir)?;
            Ok(log_dir)
        }
    }
}

fn get_config_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "relay").ok_or_else(|| {
        RelayError::Config(figment::Error::from("Could not determine config directory"))
    })?;

    let config_dir = project_dirs.config_dir();
    std::fs::create_dir_all(config_dir)?;

    Ok(config_dir.to_path_buf())
}

fn get_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "relay").ok_or_else(|| {
        RelayError::Config(figment::Error::from("Could not determine data directory"))
    })?;

    let data_dir = project_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}
