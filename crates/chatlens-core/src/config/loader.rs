//! Configuration loader for YAML files.

use std::path::Path;
use tokio::fs;

use crate::config::types::{AppConfig, ModelConfig};
use crate::errors::ChatLensError;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the application configuration from a YAML file.
    pub async fn load_app_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ChatLensError> {
        let path = path.as_ref();
        let content = Self::read(path).await?;
        serde_yaml::from_str(&content).map_err(|e| {
            ChatLensError::Config(format!(
                "failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load the model configuration from a YAML file.
    pub async fn load_model_config<P: AsRef<Path>>(path: P) -> Result<ModelConfig, ChatLensError> {
        let path = path.as_ref();
        let content = Self::read(path).await?;
        serde_yaml::from_str(&content).map_err(|e| {
            ChatLensError::Config(format!(
                "failed to parse model config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn read(path: &Path) -> Result<String, ChatLensError> {
        fs::read_to_string(path).await.map_err(|e| {
            ChatLensError::Config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })
    }
}
