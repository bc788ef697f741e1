//! Prompt management routes.

use axum::extract::{Path, State};
use axum::Json;
use chatlens_core::forwarder::CompletionClient;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptContent {
    pub content: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    chatlens_core::storage::prompts::DEFAULT_EXTENSION.to_string()
}

pub async fn list_prompts<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.prompts.list().await?))
}

pub async fn get_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let content = state.prompts.get(&name).await?;
    Ok(Json(json!({ "name": name, "content": content })))
}

pub async fn save_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
    Json(prompt): Json<PromptContent>,
) -> Result<Json<Value>, ApiError> {
    let path = state
        .prompts
        .save(&name, &prompt.content, &prompt.extension)
        .await?;

    // When the saved prompt is the configured system prompt, keep the config
    // pointing at the file that was just written.
    let mut settings = state.settings.write().await;
    let configured_stem = settings
        .app_config()
        .system_prompt_path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string);
    if configured_stem.as_deref() == Some(name.as_str()) {
        let new_path = settings
            .app_config()
            .prompts_dir
            .join(format!("{}{}", name, prompt.extension));
        if let Err(err) = settings.update_system_prompt_path(&new_path).await {
            // The prompt itself is already saved; a failed config update is
            // reported but does not fail the request.
            log::warn!("failed to update system prompt path: {}", err);
        }
    }

    Ok(Json(json!({
        "name": name,
        "path": path.display().to_string(),
        "message": "prompt saved"
    })))
}

pub async fn delete_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.prompts.delete(&name).await?;
    Ok(Json(json!({ "message": format!("prompt '{}' deleted", name) })))
}
