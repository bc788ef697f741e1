//! Current-snapshot routes: the single-slot working state of the UI.

use axum::extract::State;
use axum::Json;
use chatlens_core::core_types::{ChatMessage, ToolCall};
use chatlens_core::forwarder::CompletionClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::ErrorKind;
use tokio::fs;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CurrentText {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentTools {
    pub tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentContext {
    #[serde(default)]
    pub name: Option<String>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentToolCalls {
    pub tool_calls: Vec<ToolCall>,
}

pub async fn get_current_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let content = state.current.prompt().await?.unwrap_or_default();
    Ok(Json(json!({ "content": content })))
}

pub async fn set_current_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(prompt): Json<CurrentText>,
) -> Result<Json<Value>, ApiError> {
    state.current.set_prompt(&prompt.content).await?;
    Ok(Json(json!({ "message": "prompt set" })))
}

/// Read the configured system prompt file, falling back to the model
/// config's default path when the configured one does not exist. An absent
/// file reads as empty rather than as an error.
pub async fn get_current_system_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let (app_path, model_path) = {
        let settings = state.settings.read().await;
        (
            settings.app_config().system_prompt_path.clone(),
            settings.model_config().system_prompt_path.clone(),
        )
    };

    let path = if fs::try_exists(&app_path).await.unwrap_or(false) {
        app_path
    } else {
        model_path
    };

    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => return Err(ApiError(err.into())),
    };
    Ok(Json(json!({ "content": content })))
}

pub async fn set_current_system_prompt<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(prompt): Json<CurrentText>,
) -> Result<Json<Value>, ApiError> {
    let path = state
        .settings
        .read()
        .await
        .app_config()
        .system_prompt_path
        .clone();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| ApiError(err.into()))?;
    }
    fs::write(&path, &prompt.content)
        .await
        .map_err(|err| ApiError(err.into()))?;
    Ok(Json(json!({ "message": "system prompt set" })))
}

pub async fn get_current_tools<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let tools = state.current.tools().await?.unwrap_or_default();
    Ok(Json(json!({ "tools": tools })))
}

pub async fn set_current_tools<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(payload): Json<CurrentTools>,
) -> Result<Json<Value>, ApiError> {
    state.current.set_tools(&payload.tools).await?;
    Ok(Json(json!({ "message": "tools set" })))
}

pub async fn get_current_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    match state.current.context().await? {
        Some(document) => Ok(Json(
            serde_json::to_value(document).unwrap_or_else(|_| json!({})),
        )),
        None => Ok(Json(json!({ "name": "", "messages": [] }))),
    }
}

pub async fn set_current_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(payload): Json<CurrentContext>,
) -> Result<Json<Value>, ApiError> {
    for message in &payload.messages {
        message.validate()?;
    }

    let name = payload.name.unwrap_or_default();
    state.current.set_context(&name, &payload.messages).await?;

    // A named snapshot is also saved as a regular context document.
    if !name.is_empty() {
        state.contexts.save(&name, &payload.messages).await?;
    }

    Ok(Json(json!({ "message": "context set" })))
}

pub async fn clear_current_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    state.current.clear_context().await?;
    Ok(Json(json!({ "message": "current context cleared" })))
}

pub async fn get_current_content<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let content = state.current.content().await?.unwrap_or_default();
    Ok(Json(json!({ "content": content })))
}

pub async fn set_current_content<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(payload): Json<CurrentText>,
) -> Result<Json<Value>, ApiError> {
    state.current.set_content(&payload.content).await?;
    Ok(Json(json!({ "message": "content saved" })))
}

pub async fn get_current_tool_call<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    let tool_calls = state.current.tool_calls().await?.unwrap_or_default();
    Ok(Json(json!({
        "tool_calls": serde_json::to_value(tool_calls).unwrap_or_else(|_| json!([]))
    })))
}

pub async fn set_current_tool_call<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(payload): Json<CurrentToolCalls>,
) -> Result<Json<Value>, ApiError> {
    state.current.set_tool_calls(&payload.tool_calls).await?;
    Ok(Json(json!({ "message": "tool call saved" })))
}

pub async fn get_current_stats<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Value>, ApiError> {
    match state.stats.get().await? {
        Some(metadata) => Ok(Json(
            serde_json::to_value(metadata).unwrap_or_else(|_| json!({})),
        )),
        None => Ok(Json(json!({}))),
    }
}
