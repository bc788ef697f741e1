//! The OpenAI-compatible pass-through endpoint.

use axum::extract::State;
use axum::Json;
use chatlens_core::core_types::{CompletionRequest, CompletionResponse};
use chatlens_core::forwarder::CompletionClient;

use crate::error::ApiError;
use crate::AppState;

/// `POST /v1/chat/completions`.
///
/// Delegates to the forwarder, then persists the first choice's content and
/// tool calls into the snapshot slots and the derived metadata into the
/// stats store. The upstream response is returned verbatim.
pub async fn chat_completions<T: CompletionClient + Clone>(
    State(state): State<AppState<T>>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    log::info!(
        "chat completion request: model={:?}, messages={}",
        request.model,
        request.messages.len()
    );

    let timeout = state.settings.read().await.app_config().request_timeout();
    let (response, metadata) = state.forwarder.forward(request, timeout).await?;

    if let Some(message) = response
        .choices
        .first()
        .and_then(|choice| choice.message.as_ref())
    {
        if let Some(content) = &message.content {
            state.current.set_content(content).await?;
        }
        // An absent tool-call list is persisted as an explicit empty array
        // so the UI always has a value to render.
        match &message.tool_calls {
            Some(calls) => state.current.set_tool_calls(calls).await?,
            None => state.current.set_tool_calls(&[]).await?,
        };
    }

    state.stats.save(&metadata).await?;
    log::info!(
        "completion persisted: tokens={}, total_time={:.2}s",
        metadata.response_tokens,
        metadata.total_time
    );

    Ok(Json(response))
}
