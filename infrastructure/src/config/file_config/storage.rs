//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory for chat history and preferences
    pub dir: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Configured directory, or `<data dir>/medbot`.
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("medbot")))
            .unwrap_or_else(|| PathBuf::from(".medbot"))
    }
}
