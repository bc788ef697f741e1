//! Configuration routes.
//!
//! Saves go through the typed document: the whole config is parsed, the
//! submitted fields applied, and the result re-serialized. Storage
//! directories and the provider connection are fixed at startup; a saved
//! change to those takes effect on restart.

use axum::extract::State;
use axum::Json;
use chatlens_core::forwarder::CompletionClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfigUpdate {
    pub model_config_path: String,
    pub contexts_dir: String,
    pub stats_dir: String,
    pub prompts_dir: String,
    pub system_prompt_path: String,
}

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SystemPromptPathUpdate {
    pub system_prompt_path: String,
}

pub async fn get_config<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let settings = state.settings.read().await;
    let app = settings.app_config();
    Ok(Json(json!({
        "model_config_path": app.model_config_path.display().to_string(),
        "contexts_dir": app.contexts_dir.display().to_string(),
        "stats_dir": app.stats_dir.display().to_string(),
        "prompts_dir": app.prompts_dir.display().to_string(),
        "system_prompt_path": app.system_prompt_path.display().to_string()
    })))
}

pub async fn save_config<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(update): Json<ConfigUpdate>,
) -> Result<Json<Value>, ApiError> {
    let mut settings = state.settings.write().await;

    let mut app = settings.app_config().clone();
    app.model_config_path = PathBuf::from(update.model_config_path);
    app.contexts_dir = PathBuf::from(update.contexts_dir);
    app.stats_dir = PathBuf::from(update.stats_dir);
    app.prompts_dir = PathBuf::from(update.prompts_dir);
    app.system_prompt_path = PathBuf::from(update.system_prompt_path);

    settings.save_app_config(app).await?;
    log::info!("configuration saved to {}", settings.config_path().display());
    Ok(Json(json!({ "message": "configuration saved" })))
}

pub async fn get_config_raw<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let content = state.settings.read().await.raw().await?;
    Ok(Json(json!({ "content": content })))
}

pub async fn save_config_raw<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(payload): Json<RawConfig>,
) -> Result<Json<Value>, ApiError> {
    if payload.content.is_empty() {
        return Err(ApiError(chatlens_core::ChatLensError::Validation(
            "content must not be empty".to_string(),
        )));
    }

    state.settings.write().await.save_raw(&payload.content).await?;
    Ok(Json(json!({ "message": "configuration saved" })))
}

pub async fn update_system_prompt_path<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(update): Json<SystemPromptPathUpdate>,
) -> Result<Json<Value>, ApiError> {
    state
        .settings
        .write()
        .await
        .update_system_prompt_path(&update.system_prompt_path)
        .await?;
    Ok(Json(json!({
        "message": "system prompt path updated",
        "path": update.system_prompt_path
    })))
}
