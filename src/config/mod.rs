//! Configuration management
//!
//! Configuration is stored in TOML format at ~/.chromeforge/config.toml and
//! created with defaults on first run. Every field carries a serde default so
//! a partial file is always valid.
//!
//! The API credential is deliberately NOT part of the config file: it is read
//! from the `OPENAI_API_KEY` environment variable and its absence is a hard
//! configuration error raised before any network call.

use crate::error::ForgeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Model gateway settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Output directory settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Model gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Frontier-tier model identifier (preferred, may be unavailable)
    #[serde(default = "default_frontier_model")]
    pub frontier_model: String,

    /// Stable-tier model identifier (guaranteed fallback, used for audits)
    #[serde(default = "default_stable_model")]
    pub stable_model: String,

    /// Per-attempt ceiling on generation latency, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    // Note: API key comes from the OPENAI_API_KEY env var, not from config
}

/// Output directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the generated extension is materialized into.
    /// Fully owned by the engine: it is deleted and recreated on every build.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_frontier_model() -> String {
    "gpt-5".to_string()
}

fn default_stable_model() -> String {
    "gpt-4o".to_string()
}

fn default_request_timeout() -> u64 {
    600
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated_extension")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            frontier_model: default_frontier_model(),
            stable_model: default_stable_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Default config file location: ~/.chromeforge/config.toml
    pub fn default_path() -> Result<PathBuf, ForgeError> {
        let home = dirs::home_dir()
            .ok_or_else(|| ForgeError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".chromeforge").join("config.toml"))
    }

    /// Load configuration from the default location, creating the file with
    /// defaults if it does not exist yet
    pub fn load_or_create() -> Result<Self, ForgeError> {
        let path = Self::default_path()?;
        if path.exists() {
            return Self::load_from_path(&path);
        }

        let config = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ForgeError::Config(format!("failed to create config dir: {}", e)))?;
        }
        let body = toml::to_string_pretty(&config)
            .map_err(|e| ForgeError::Config(format!("failed to serialize defaults: {}", e)))?;
        fs::write(&path, body)
            .map_err(|e| ForgeError::Config(format!("failed to write {}: {}", path.display(), e)))?;

        tracing::info!("Created default config at {}", path.display());
        Ok(config)
    }

    /// Load configuration from an explicit path; the file must exist
    pub fn load_from_path(path: &Path) -> Result<Self, ForgeError> {
        let body = fs::read_to_string(path)
            .map_err(|e| ForgeError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&body)
            .map_err(|e| ForgeError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }
}
