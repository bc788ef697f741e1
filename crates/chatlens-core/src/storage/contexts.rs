//! Context store: named JSON documents holding an ordered message list.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core_types::ChatMessage;
use crate::errors::ChatLensError;

/// Reserved prefix of the single-slot snapshot files living in the same
/// directory; those never appear in the listing.
const RESERVED_PREFIX: &str = "current_";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContextDocument {
    pub name: String,
    pub messages: Vec<ChatMessage>,
}

pub struct ContextStore {
    contexts_dir: PathBuf,
}

impl ContextStore {
    pub fn new<P: AsRef<Path>>(contexts_dir: P) -> Result<Self, ChatLensError> {
        let contexts_dir = contexts_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&contexts_dir)?;
        Ok(Self { contexts_dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.contexts_dir.join(format!("{}.json", name))
    }

    fn generate_default_name() -> String {
        format!("context_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Sorted stems of all saved contexts, excluding the reserved snapshot
    /// files.
    pub async fn list(&self) -> Result<Vec<String>, ChatLensError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.contexts_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with(RESERVED_PREFIX) {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load a context by name. A malformed document is a validation error,
    /// distinct from the document being absent.
    pub async fn get(&self, name: &str) -> Result<ContextDocument, ChatLensError> {
        let path = self.path_for(name);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ChatLensError::NotFound(format!(
                    "context '{}' not found",
                    name
                )))
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&content).map_err(|e| {
            ChatLensError::Validation(format!("context '{}' is not a valid document: {}", name, e))
        })
    }

    /// Save a context. An empty name gets a generated timestamp name.
    /// Returns the name actually used and the file location.
    pub async fn save(
        &self,
        name: &str,
        messages: &[ChatMessage],
    ) -> Result<(String, PathBuf), ChatLensError> {
        let name = if name.is_empty() {
            Self::generate_default_name()
        } else {
            name.to_string()
        };

        let document = ContextDocument {
            name: name.clone(),
            messages: messages.to_vec(),
        };
        let path = self.path_for(&name);
        let serialized = serde_json::to_string_pretty(&document).map_err(|e| {
            ChatLensError::Internal(format!("failed to serialize context '{}': {}", name, e))
        })?;
        fs::write(&path, serialized).await?;
        Ok((name, path))
    }

    pub async fn delete(&self, name: &str) -> Result<(), ChatLensError> {
        match fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ChatLensError::NotFound(format!(
                "context '{}' not found",
                name
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Rename a context. Refuses to clobber: if the target name is already
    /// occupied, both documents are left untouched. The embedded name field
    /// is rewritten on success.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<(), ChatLensError> {
        let old_path = self.path_for(old_name);
        let new_path = self.path_for(new_name);

        if !fs::try_exists(&old_path).await? {
            return Err(ChatLensError::NotFound(format!(
                "context '{}' not found",
                old_name
            )));
        }
        if fs::try_exists(&new_path).await? {
            return Err(ChatLensError::Validation(format!(
                "context '{}' already exists",
                new_name
            )));
        }

        fs::rename(&old_path, &new_path).await?;

        let mut document = self.get(new_name).await?;
        document.name = new_name.to_string();
        let serialized = serde_json::to_string_pretty(&document).map_err(|e| {
            ChatLensError::Internal(format!("failed to serialize context '{}': {}", new_name, e))
        })?;
        fs::write(&new_path, serialized).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Role;
    use tempfile::TempDir;

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: Role::User,
            content: Some("hi".to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        let (name, _) = store.save("session-a", &messages()).await.unwrap();
        assert_eq!(name, "session-a");

        let document = store.get("session-a").await.unwrap();
        assert_eq!(document.name, "session-a");
        assert_eq!(document.messages.len(), 1);
        assert_eq!(document.messages[0].content.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_empty_name_generates_timestamp_name() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        let (name, path) = store.save("", &messages()).await.unwrap();
        assert!(name.starts_with("context_"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_listing_excludes_reserved_snapshot_files() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        store.save("kept", &messages()).await.unwrap();
        std::fs::write(dir.path().join("current_context.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a context").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_malformed_document_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        assert!(matches!(
            store.get("broken").await,
            Err(ChatLensError::Validation(_))
        ));
        assert!(matches!(
            store.get("missing").await,
            Err(ChatLensError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_rewrites_embedded_name() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        store.save("before", &messages()).await.unwrap();
        store.rename("before", "after").await.unwrap();

        assert!(matches!(
            store.get("before").await,
            Err(ChatLensError::NotFound(_))
        ));
        assert_eq!(store.get("after").await.unwrap().name, "after");
    }

    #[tokio::test]
    async fn test_rename_refuses_to_clobber() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        store.save("one", &messages()).await.unwrap();
        store.save("two", &[]).await.unwrap();

        let err = store.rename("one", "two").await.unwrap_err();
        assert!(matches!(err, ChatLensError::Validation(_)));

        // Both documents survive unchanged.
        assert_eq!(store.get("one").await.unwrap().messages.len(), 1);
        assert_eq!(store.get("two").await.unwrap().messages.len(), 0);
    }

    #[tokio::test]
    async fn test_rename_missing_context_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path()).unwrap();

        assert!(matches!(
            store.rename("ghost", "anything").await,
            Err(ChatLensError::NotFound(_))
        ));
    }
}
