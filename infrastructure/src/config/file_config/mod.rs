//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod repl;
mod server;
mod storage;
mod study;

pub use output::FileOutputConfig;
pub use repl::FileReplConfig;
pub use server::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, FileServerConfig};
pub use storage::FileStorageConfig;
pub use study::FileStudyConfig;

use medbot_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend location and endpoint paths
    pub server: FileServerConfig,
    /// Where client-side state is kept
    pub storage: FileStorageConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Defaults for flashcard requests
    pub study: FileStudyConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. The server base URL, timeout and endpoint paths
    /// 2. Study defaults (difficulty value, card count)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.server.validate();
        issues.extend(study::validate(&self.study));
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbot_domain::Theme;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
base_url = "https://medbot.example.org"
timeout_secs = 30

[server.endpoints]
exam_generate = "/exam/generate"

[storage]
dir = "/tmp/medbot"

[output]
color = false
theme = "light"

[study]
university = "University of Toronto"
num_cards = 20
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://medbot.example.org");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.server.endpoints.exam_generate, "/exam/generate");
        assert_eq!(
            config.storage.dir.as_deref(),
            Some(std::path::Path::new("/tmp/medbot"))
        );
        assert!(!config.output.color);
        assert_eq!(config.output.theme, Some(Theme::Light));
        assert_eq!(config.study.university, "University of Toronto");
        assert_eq!(config.study.course, "Medicine");
        assert_eq!(config.study.num_cards, 20);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[output]
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        // Defaults should apply
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert!(config.repl.show_progress);
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.server.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.output.color);
        assert!(config.output.theme.is_none());
        assert_eq!(config.study.num_cards, 10);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let mut config = FileConfig::default();
        config.server.base_url = "not a url".to_string();
        config.study.difficulty = "impossible".to_string();
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.is_error()));
    }
}
