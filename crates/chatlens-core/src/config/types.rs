//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::forwarder::DEFAULT_TIMEOUT;

/// Application-level configuration (`config/config.yaml`).
///
/// `temperature` and `max_tokens` here override the model config's defaults
/// when present; a value supplied on an individual request still wins over
/// both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model_config_path: PathBuf,
    pub contexts_dir: PathBuf,
    pub stats_dir: PathBuf,
    pub prompts_dir: PathBuf,
    pub system_prompt_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Upstream request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        self.timeout
            .map(Duration::from_secs_f64)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("0.0.0.0")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8080)
    }
}

/// Model/provider configuration, referenced by `model_config_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider base URL, including the `/v1` segment.
    pub provider_url: String,
    pub api_key: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default = "default_console")]
    pub console: bool,
    /// Append to the log file instead of truncating it at startup.
    #[serde(default)]
    pub append: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            console: true,
            append: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_console() -> bool {
    true
}
