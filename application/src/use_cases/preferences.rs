//! Theme preference.

use crate::ports::storage::{KeyValueStore, StorageError};
use medbot_domain::Theme;
use std::sync::Arc;
use tracing::warn;

/// Storage key the theme is saved under.
pub const THEME_KEY: &str = "theme";

/// Reads and writes the persisted theme.
#[derive(Clone)]
pub struct ThemePreference {
    storage: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Saved theme, or the default when nothing valid is stored.
    pub fn load(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Failed to read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<(), StorageError> {
        self.storage.set(THEME_KEY, theme.as_str())
    }

    /// Switch to the other theme and persist it.
    pub fn toggle(&self) -> Result<Theme, StorageError> {
        let theme = self.load().toggled();
        self.save(theme)?;
        Ok(theme)
    }
}
