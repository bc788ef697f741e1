//! Statistics store: one slot holding the metadata of the latest completion.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core_types::ResponseMetadata;
use crate::errors::ChatLensError;

const STATS_SLOT: &str = "current_stats.json";

pub struct StatsStore {
    stats_dir: PathBuf,
}

impl StatsStore {
    pub fn new<P: AsRef<Path>>(stats_dir: P) -> Result<Self, ChatLensError> {
        let stats_dir = stats_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&stats_dir)?;
        Ok(Self { stats_dir })
    }

    /// Overwrite the slot with the latest record.
    pub async fn save(&self, metadata: &ResponseMetadata) -> Result<PathBuf, ChatLensError> {
        let path = self.stats_dir.join(STATS_SLOT);
        let serialized = serde_json::to_string_pretty(metadata)
            .map_err(|e| ChatLensError::Internal(format!("failed to serialize stats: {}", e)))?;
        fs::write(&path, serialized).await?;
        Ok(path)
    }

    pub async fn get(&self) -> Result<Option<ResponseMetadata>, ChatLensError> {
        let path = self.stats_dir.join(STATS_SLOT);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ChatLensError::Validation(format!("stats document is malformed: {}", e)))
    }
}
