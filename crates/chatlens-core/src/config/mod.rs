//! Configuration module for the proxy.
//!
//! Two YAML documents drive the process: the application config (storage
//! directories, server address, optional parameter overrides, logging) and
//! the model config it points at (provider URL, credential, model defaults).
//! Both are loaded once at startup; the forwarder only ever reads resolved
//! values.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;


use std::path::{Path, PathBuf};

use crate::errors::ChatLensError;

/// Owner of the loaded configuration pair.
///
/// Holds the path it was loaded from so the config API can persist updates
/// and reload. Updates go through typed re-serialization: the whole document
/// is parsed, one field mutated, and the result written back. Comments in
/// the original file are not preserved.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    app_config: AppConfig,
    model_config: ModelConfig,
}

impl ConfigManager {
    /// Load the application config and the model config it points at.
    pub async fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, ChatLensError> {
        let config_path = config_path.as_ref().to_path_buf();
        let app_config = ConfigLoader::load_app_config(&config_path).await?;
        let model_config = ConfigLoader::load_model_config(&app_config.model_config_path).await?;
        Ok(Self {
            config_path,
            app_config,
            model_config,
        })
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn model_config(&self) -> &ModelConfig {
        &self.model_config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Re-read both documents from disk.
    pub async fn reload(&mut self) -> Result<(), ChatLensError> {
        self.app_config = ConfigLoader::load_app_config(&self.config_path).await?;
        self.model_config =
            ConfigLoader::load_model_config(&self.app_config.model_config_path).await?;
        Ok(())
    }

    /// Raw text of the application config file.
    pub async fn raw(&self) -> Result<String, ChatLensError> {
        match tokio::fs::read_to_string(&self.config_path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(
                ChatLensError::NotFound(format!("config file {} not found", self.config_path.display())),
            ),
            Err(err) => Err(err.into()),
        }
    }

    /// Persist a full application config document and reload the model
    /// config it points at.
    pub async fn save_app_config(&mut self, app_config: AppConfig) -> Result<(), ChatLensError> {
        let serialized = serde_yaml::to_string(&app_config).map_err(|e| {
            ChatLensError::Config(format!("failed to serialize configuration: {}", e))
        })?;
        tokio::fs::write(&self.config_path, serialized).await?;
        self.app_config = app_config;
        self.model_config =
            ConfigLoader::load_model_config(&self.app_config.model_config_path).await?;
        Ok(())
    }

    /// Validate raw YAML against the typed schema, persist it, and reload.
    pub async fn save_raw(&mut self, content: &str) -> Result<(), ChatLensError> {
        let app_config: AppConfig = serde_yaml::from_str(content).map_err(|e| {
            ChatLensError::Validation(format!("invalid configuration YAML: {}", e))
        })?;
        tokio::fs::write(&self.config_path, content).await?;
        self.app_config = app_config;
        self.model_config =
            ConfigLoader::load_model_config(&self.app_config.model_config_path).await?;
        Ok(())
    }

    /// Structured partial update of `system_prompt_path`: parse the whole
    /// document, mutate the one field, re-serialize deterministically.
    pub async fn update_system_prompt_path<P: AsRef<Path>>(
        &mut self,
        new_path: P,
    ) -> Result<(), ChatLensError> {
        let mut updated = ConfigLoader::load_app_config(&self.config_path).await?;
        updated.system_prompt_path = new_path.as_ref().to_path_buf();
        self.save_app_config(updated).await
    }
}
