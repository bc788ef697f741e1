//! Saved-context management routes.

use axum::extract::{Path, State};
use axum::Json;
use chatlens_core::core_types::ChatMessage;
use chatlens_core::forwarder::CompletionClient;
use chatlens_core::storage::ContextDocument;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContextPayload {
    #[serde(default)]
    pub name: Option<String>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_name: String,
}

pub async fn list_contexts<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.contexts.list().await?))
}

pub async fn get_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
) -> Result<Json<ContextDocument>, ApiError> {
    Ok(Json(state.contexts.get(&name).await?))
}

pub async fn save_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
    Json(payload): Json<ContextPayload>,
) -> Result<Json<Value>, ApiError> {
    for message in &payload.messages {
        message.validate()?;
    }

    // The payload name wins over the path segment when both are given.
    let context_name = payload
        .name
        .filter(|candidate| !candidate.is_empty())
        .unwrap_or(name);
    let (saved_name, path) = state
        .contexts
        .save(&context_name, &payload.messages)
        .await?;

    Ok(Json(json!({
        "name": saved_name,
        "path": path.display().to_string(),
        "message": "context saved"
    })))
}

pub async fn delete_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.contexts.delete(&name).await?;
    Ok(Json(json!({ "message": format!("context '{}' deleted", name) })))
}

pub async fn rename_context<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Path(name): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<Value>, ApiError> {
    state.contexts.rename(&name, &request.new_name).await?;
    Ok(Json(json!({
        "message": format!("context '{}' renamed to '{}'", name, request.new_name)
    })))
}
