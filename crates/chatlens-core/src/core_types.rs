//! Wire types for the OpenAI chat-completions protocol.
//!
//! These structures are the contract on both sides of the proxy: the
//! pass-through endpoint accepts and returns them unchanged, and the stores
//! persist them. Serialization omits absent optional fields so that a
//! round-trip through disk or the wire never invents keys, while explicit
//! values (including `0` and `false`) always survive.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ChatLensError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in a conversation context.
///
/// Tool-call flow: an `assistant` message may carry `tool_calls` (with or
/// without content, but at least one of the two), and the later `tool`
/// message answers it via a matching `tool_call_id`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Check the structural invariants a message must satisfy before it is
    /// persisted into a context document.
    pub fn validate(&self) -> Result<(), ChatLensError> {
        match self.role {
            Role::Tool => {
                if self.tool_call_id.is_none() {
                    return Err(ChatLensError::Validation(
                        "tool message is missing tool_call_id".to_string(),
                    ));
                }
            }
            Role::Assistant => {
                let has_tool_calls = self
                    .tool_calls
                    .as_ref()
                    .map(|calls| !calls.is_empty())
                    .unwrap_or(false);
                if self.content.is_none() && !has_tool_calls {
                    return Err(ChatLensError::Validation(
                        "assistant message must carry content or tool calls".to_string(),
                    ));
                }
            }
            _ => {}
        }

        if let Some(tool_calls) = &self.tool_calls {
            for call in tool_calls {
                call.validate()?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, kept as the provider sent it.
    pub arguments: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_tool_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn validate(&self) -> Result<(), ChatLensError> {
        serde_json::from_str::<Value>(&self.function.arguments).map_err(|e| {
            ChatLensError::Validation(format!(
                "tool call '{}' carries invalid JSON arguments: {}",
                self.id, e
            ))
        })?;
        Ok(())
    }
}

fn default_tool_call_type() -> String {
    "function".to_string()
}

/// An outbound chat-completion request.
///
/// `model`, `temperature` and `max_tokens` are optional here; the forwarder
/// fills them from configuration when the caller leaves them unset. The
/// `stream` flag is accepted for wire compatibility but never honored: every
/// exchange is a single synchronous request/response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Choice {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompletionResponse {
    pub id: String,
    #[serde(default = "default_object_kind")]
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

fn default_object_kind() -> String {
    "chat.completion".to_string()
}

/// Timing and throughput record derived from one completion exchange.
///
/// Computed once per call and overwritten by the next; history is the
/// store's concern, not this record's. All durations are in seconds. With a
/// non-streaming transport `latency`, `time_to_first_token` and `total_time`
/// are all the same round-trip duration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseMetadata {
    pub timestamp: String,
    pub latency: f64,
    pub time_to_first_token: f64,
    pub total_time: f64,
    pub response_tokens: u32,
    pub response_words: usize,
    pub response_characters: usize,
    pub avg_token_length: f64,
    pub avg_word_tokens: f64,
    pub context_tokens: u32,
    pub inference_speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_message(content: &str) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: Some(content.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[test]
    fn test_request_serialization_omits_absent_fields() {
        let request = CompletionRequest {
            model: None,
            messages: vec![user_message("hi")],
            temperature: None,
            max_tokens: None,
            tools: None,
            tool_choice: None,
            stream: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["messages"]);
    }

    #[test]
    fn test_request_serialization_keeps_explicit_zero_and_false() {
        let request = CompletionRequest {
            model: Some("gpt-x".to_string()),
            messages: vec![user_message("hi")],
            temperature: Some(0.0),
            max_tokens: Some(0),
            tools: None,
            tool_choice: None,
            stream: Some(false),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["max_tokens"], json!(0));
        assert_eq!(value["temperature"], json!(0.0));
        assert_eq!(value["stream"], json!(false));

        let back: CompletionRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back.max_tokens, Some(0));
        assert_eq!(back.stream, Some(false));
    }

    #[test]
    fn test_message_round_trip_preserves_non_ascii() {
        let message = user_message("привет");
        let encoded = serde_json::to_string(&message).unwrap();
        assert!(encoded.contains("привет"));

        let back: ChatMessage = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back.content.as_deref(), Some("привет"));
    }

    #[test]
    fn test_tool_message_requires_tool_call_id() {
        let message = ChatMessage {
            role: Role::Tool,
            content: Some("{\"ok\":true}".to_string()),
            name: Some("lookup".to_string()),
            tool_calls: None,
            tool_call_id: None,
        };
        assert!(matches!(
            message.validate(),
            Err(ChatLensError::Validation(_))
        ));
    }

    #[test]
    fn test_assistant_message_needs_content_or_tool_calls() {
        let empty = ChatMessage {
            role: Role::Assistant,
            content: None,
            name: None,
            tool_calls: Some(Vec::new()),
            tool_call_id: None,
        };
        assert!(empty.validate().is_err());

        let with_calls = ChatMessage {
            role: Role::Assistant,
            content: None,
            name: None,
            tool_calls: Some(vec![ToolCall {
                id: "call_1".to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: "lookup".to_string(),
                    arguments: "{\"city\":\"Oslo\"}".to_string(),
                },
            }]),
            tool_call_id: None,
        };
        assert!(with_calls.validate().is_ok());
    }

    #[test]
    fn test_tool_call_arguments_must_be_json() {
        let call = ToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "lookup".to_string(),
                arguments: "not json".to_string(),
            },
        };
        assert!(matches!(call.validate(), Err(ChatLensError::Validation(_))));
    }

    #[test]
    fn test_response_defaults_object_kind() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "id": "cmpl-1",
            "created": 1700000000,
            "model": "gpt-x",
            "choices": []
        }))
        .unwrap();
        assert_eq!(response.object, "chat.completion");
        assert!(response.usage.is_none());
    }
}
