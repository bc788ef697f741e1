//! Single-slot snapshot store.
//!
//! Each slot is one reserved file: the most recent response content, its
//! tool calls, the in-flight context, the working prompt, and the tool
//! definitions the UI is editing. Writing a slot overwrites the previous
//! value; there is exactly one of each.

use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core_types::{ChatMessage, ToolCall};
use crate::errors::ChatLensError;
use crate::storage::contexts::ContextDocument;

const CONTENT_SLOT: &str = "current_content.md";
const TOOL_CALL_SLOT: &str = "current_tool_call.json";
const CONTEXT_SLOT: &str = "current_context.json";
const PROMPT_SLOT: &str = "current_prompt.txt";
const TOOLS_SLOT: &str = "current_tools.json";

pub struct CurrentStore {
    dir: PathBuf,
}

impl CurrentStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, ChatLensError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub async fn set_content(&self, content: &str) -> Result<PathBuf, ChatLensError> {
        self.write_slot(CONTENT_SLOT, content.as_bytes()).await
    }

    pub async fn content(&self) -> Result<Option<String>, ChatLensError> {
        self.read_slot(CONTENT_SLOT).await
    }

    pub async fn set_tool_calls(&self, tool_calls: &[ToolCall]) -> Result<PathBuf, ChatLensError> {
        let serialized = serde_json::to_string_pretty(tool_calls)
            .map_err(|e| ChatLensError::Internal(format!("failed to serialize tool calls: {}", e)))?;
        self.write_slot(TOOL_CALL_SLOT, serialized.as_bytes()).await
    }

    pub async fn tool_calls(&self) -> Result<Option<Vec<ToolCall>>, ChatLensError> {
        self.read_json_slot(TOOL_CALL_SLOT).await
    }

    pub async fn set_context(
        &self,
        name: &str,
        messages: &[ChatMessage],
    ) -> Result<PathBuf, ChatLensError> {
        let document = ContextDocument {
            name: name.to_string(),
            messages: messages.to_vec(),
        };
        let serialized = serde_json::to_string_pretty(&document)
            .map_err(|e| ChatLensError::Internal(format!("failed to serialize context: {}", e)))?;
        self.write_slot(CONTEXT_SLOT, serialized.as_bytes()).await
    }

    pub async fn context(&self) -> Result<Option<ContextDocument>, ChatLensError> {
        self.read_json_slot(CONTEXT_SLOT).await
    }

    /// Remove the context slot. Returns whether there was one.
    pub async fn clear_context(&self) -> Result<bool, ChatLensError> {
        match fs::remove_file(self.dir.join(CONTEXT_SLOT)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn set_prompt(&self, content: &str) -> Result<PathBuf, ChatLensError> {
        self.write_slot(PROMPT_SLOT, content.as_bytes()).await
    }

    pub async fn prompt(&self) -> Result<Option<String>, ChatLensError> {
        self.read_slot(PROMPT_SLOT).await
    }

    pub async fn set_tools(&self, tools: &[Value]) -> Result<PathBuf, ChatLensError> {
        let serialized = serde_json::to_string_pretty(tools)
            .map_err(|e| ChatLensError::Internal(format!("failed to serialize tools: {}", e)))?;
        self.write_slot(TOOLS_SLOT, serialized.as_bytes()).await
    }

    pub async fn tools(&self) -> Result<Option<Vec<Value>>, ChatLensError> {
        self.read_json_slot(TOOLS_SLOT).await
    }

    async fn write_slot(&self, slot: &str, bytes: &[u8]) -> Result<PathBuf, ChatLensError> {
        let path = self.dir.join(slot);
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn read_slot(&self, slot: &str) -> Result<Option<String>, ChatLensError> {
        match fs::read_to_string(self.dir.join(slot)).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_json_slot<T: serde::de::DeserializeOwned>(
        &self,
        slot: &str,
    ) -> Result<Option<T>, ChatLensError> {
        let Some(content) = self.read_slot(slot).await? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ChatLensError::Validation(format!("slot {} is malformed: {}", slot, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{FunctionCall, Role};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_content_slot_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = CurrentStore::new(dir.path()).unwrap();

        assert_eq!(store.content().await.unwrap(), None);
        store.set_content("first").await.unwrap();
        store.set_content("second").await.unwrap();
        assert_eq!(store.content().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_tool_call_slot_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CurrentStore::new(dir.path()).unwrap();

        let calls = vec![ToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "lookup".to_string(),
                arguments: "{\"city\":\"Осло\"}".to_string(),
            },
        }];
        store.set_tool_calls(&calls).await.unwrap();

        let loaded = store.tool_calls().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].function.arguments, "{\"city\":\"Осло\"}");

        // An explicitly empty list is a value, not an absent slot.
        store.set_tool_calls(&[]).await.unwrap();
        assert_eq!(store.tool_calls().await.unwrap().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_context_slot_set_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = CurrentStore::new(dir.path()).unwrap();

        let messages = vec![ChatMessage {
            role: Role::User,
            content: Some("hi".to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }];
        store.set_context("scratch", &messages).await.unwrap();
        assert_eq!(store.context().await.unwrap().unwrap().name, "scratch");

        assert!(store.clear_context().await.unwrap());
        assert!(!store.clear_context().await.unwrap());
        assert!(store.context().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_slot_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let store = CurrentStore::new(dir.path()).unwrap();

        std::fs::write(dir.path().join(TOOL_CALL_SLOT), "{oops").unwrap();
        assert!(matches!(
            store.tool_calls().await,
            Err(ChatLensError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_prompt_and_tools_slots() {
        let dir = TempDir::new().unwrap();
        let store = CurrentStore::new(dir.path()).unwrap();

        store.set_prompt("working prompt").await.unwrap();
        assert_eq!(
            store.prompt().await.unwrap().as_deref(),
            Some("working prompt")
        );

        let tools = vec![json!({"type": "function", "function": {"name": "lookup"}})];
        store.set_tools(&tools).await.unwrap();
        assert_eq!(store.tools().await.unwrap().unwrap(), tools);
    }
}
