//! Prompt store: plain text documents with extension probing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::ChatLensError;

/// Lookup probes these in order; writes default to the first.
const EXTENSION_PROBE_ORDER: [&str; 3] = [".txt", ".md", ""];

pub const DEFAULT_EXTENSION: &str = ".txt";

pub struct PromptStore {
    prompts_dir: PathBuf,
}

impl PromptStore {
    pub fn new<P: AsRef<Path>>(prompts_dir: P) -> Result<Self, ChatLensError> {
        let prompts_dir = prompts_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&prompts_dir)?;
        Ok(Self { prompts_dir })
    }

    /// Sorted stems of all stored prompts. Hidden files are skipped.
    pub async fn list(&self) -> Result<Vec<String>, ChatLensError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.prompts_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn get(&self, name: &str) -> Result<String, ChatLensError> {
        for ext in EXTENSION_PROBE_ORDER {
            let path = self.prompts_dir.join(format!("{}{}", name, ext));
            match fs::read_to_string(&path).await {
                Ok(content) => return Ok(content),
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(ChatLensError::NotFound(format!(
            "prompt '{}' not found",
            name
        )))
    }

    pub async fn save(
        &self,
        name: &str,
        content: &str,
        extension: &str,
    ) -> Result<PathBuf, ChatLensError> {
        let path = self.prompts_dir.join(format!("{}{}", name, extension));
        fs::write(&path, content).await?;
        Ok(path)
    }

    pub async fn delete(&self, name: &str) -> Result<(), ChatLensError> {
        for ext in EXTENSION_PROBE_ORDER {
            let path = self.prompts_dir.join(format!("{}{}", name, ext));
            match fs::remove_file(&path).await {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(ChatLensError::NotFound(format!(
            "prompt '{}' not found",
            name
        )))
    }
}
