//! The completion forwarder: the one piece of this proxy with real logic.
//!
//! A forwarder resolves configuration-driven defaults onto an outbound
//! request, issues exactly one bounded POST to the upstream provider, and
//! derives a timing/throughput record from the response. It performs no
//! retries and no persistence; failures propagate to the caller with their
//! taxonomy intact so the HTTP surface can map them onto precise statuses.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

use crate::config::{AppConfig, ModelConfig};
use crate::core_types::{CompletionRequest, CompletionResponse, ResponseMetadata};
use crate::errors::ChatLensError;

/// Default bound on the upstream call when the configuration does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const COMPLETIONS_SUFFIX: &str = "/chat/completions";

/// Seam for the HTTP surface, so route handlers can be exercised against a
/// scripted fake instead of a live provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn forward(
        &self,
        request: CompletionRequest,
        timeout: Duration,
    ) -> Result<(CompletionResponse, ResponseMetadata), ChatLensError>;
}

/// Forwards completion requests to one OpenAI-compatible upstream provider.
///
/// Holds no mutable state: concurrent invocations are independent, and the
/// handle is cheap to clone.
#[derive(Debug, Clone)]
pub struct CompletionForwarder {
    client: Client,
    base_url: String,
    api_key: String,
    default_model: String,
    default_temperature: f32,
    default_max_tokens: u32,
}

impl CompletionForwarder {
    /// Build a forwarder from the model config, with the app config's
    /// parameter overrides taking precedence over the model defaults.
    pub fn new(model_config: &ModelConfig, app_config: Option<&AppConfig>) -> Self {
        let default_temperature = app_config
            .and_then(|app| app.temperature)
            .unwrap_or(model_config.temperature);
        let default_max_tokens = app_config
            .and_then(|app| app.max_tokens)
            .unwrap_or(model_config.max_tokens);

        Self {
            client: Client::new(),
            base_url: model_config.provider_url.trim_end_matches('/').to_string(),
            api_key: model_config.api_key.clone(),
            default_model: model_config.model_name.clone(),
            default_temperature,
            default_max_tokens,
        }
    }

    /// Fill unset parameters from configuration. A value the caller supplied
    /// is always honored; a blank model name counts as unset.
    pub fn resolve_defaults(&self, request: &mut CompletionRequest) {
        if request.temperature.is_none() {
            request.temperature = Some(self.default_temperature);
        }
        if request.max_tokens.is_none() {
            request.max_tokens = Some(self.default_max_tokens);
        }
        let model_is_blank = request
            .model
            .as_deref()
            .map(|model| model.trim().is_empty())
            .unwrap_or(true);
        if model_is_blank {
            request.model = Some(self.default_model.clone());
        }
    }

    /// Derive the statistics record from a response and its timing samples.
    ///
    /// Pure function of its inputs apart from the wall-clock timestamp; every
    /// division guards the zero-denominator case.
    pub fn extract_metadata(
        response: &CompletionResponse,
        latency: f64,
        time_to_first_token: f64,
        total_time: f64,
    ) -> ResponseMetadata {
        let usage = response.usage.as_ref();
        let response_tokens = usage.map(|u| u.completion_tokens).unwrap_or(0);
        let context_tokens = usage.map(|u| u.prompt_tokens).unwrap_or(0);

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or("");

        let response_words = content.split_whitespace().count();
        let response_characters = content.chars().count();

        let avg_token_length = if response_tokens > 0 {
            response_characters as f64 / response_tokens as f64
        } else {
            0.0
        };
        let avg_word_tokens = if response_words > 0 {
            response_tokens as f64 / response_words as f64
        } else {
            0.0
        };
        let inference_speed = if total_time > 0.0 {
            response_tokens as f64 / total_time
        } else {
            0.0
        };

        ResponseMetadata {
            timestamp: chrono::Utc::now().to_rfc3339(),
            latency,
            time_to_first_token,
            total_time,
            response_tokens,
            response_words,
            response_characters,
            avg_token_length,
            avg_word_tokens,
            context_tokens,
            inference_speed,
        }
    }
}

#[async_trait]
impl CompletionClient for CompletionForwarder {
    async fn forward(
        &self,
        mut request: CompletionRequest,
        timeout: Duration,
    ) -> Result<(CompletionResponse, ResponseMetadata), ChatLensError> {
        self.resolve_defaults(&mut request);

        let url = format!("{}{}", self.base_url, COMPLETIONS_SUFFIX);
        log::debug!("forwarding completion request to {}", url);
        log::debug!(
            "resolved parameters: model={:?}, temperature={:?}, max_tokens={:?}",
            request.model,
            request.temperature,
            request.max_tokens
        );

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;
        let elapsed = started.elapsed().as_secs_f64();

        if !status.is_success() {
            log::error!("upstream provider returned {}: {}", status, body);
            return Err(ChatLensError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        // Non-streaming transport: the first observable token instant is the
        // arrival of the whole body, so all three samples collapse to the
        // round-trip duration.
        let latency = elapsed;
        let time_to_first_token = elapsed;
        let total_time = elapsed;

        let completion: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            ChatLensError::Protocol(format!("invalid completion response JSON: {}", e))
        })?;

        let metadata =
            Self::extract_metadata(&completion, latency, time_to_first_token, total_time);
        log::info!(
            "completion {} finished: {} tokens in {:.2}s",
            completion.id,
            metadata.response_tokens,
            metadata.total_time
        );

        Ok((completion, metadata))
    }
}

fn classify_transport_error(err: reqwest::Error) -> ChatLensError {
    if err.is_timeout() {
        ChatLensError::Transport(format!("upstream request timed out: {}", err))
    } else {
        ChatLensError::Transport(format!("upstream request failed: {}", err))
    }
}
