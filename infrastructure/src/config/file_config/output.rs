//! Output configuration from TOML (`[output]` section)

use medbot_domain::Theme;
use serde::{Deserialize, Serialize};

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Force a theme instead of the saved preference
    pub theme: Option<Theme>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            theme: None,
        }
    }
}
