//! Configuration file loading for medbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Environment: `MEDBOT_SECTION__KEY` variables
//! 3. Project root: `./medbot.toml` or `./.medbot.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/medbot/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, FileConfig, FileOutputConfig, FileReplConfig,
    FileServerConfig, FileStorageConfig, FileStudyConfig,
};
pub use loader::ConfigLoader;
