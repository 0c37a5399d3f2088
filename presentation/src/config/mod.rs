//! Presentation-level configuration
//!
//! Configuration for output formatting and REPL behavior.

use medbot_domain::Theme;
use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Theme override; `None` uses the saved preference
    pub theme: Option<Theme>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            theme: None,
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Show a spinner until the first reply fragment arrives
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl ReplConfig {
    /// Configured history file, or `<data dir>/medbot/repl_history.txt`.
    pub fn history_path(&self) -> Option<std::path::PathBuf> {
        match &self.history_file {
            Some(path) => Some(path.into()),
            None => dirs::data_dir().map(|p| p.join("medbot").join("repl_history.txt")),
        }
    }
}
