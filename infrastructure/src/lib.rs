//! Infrastructure layer for medbot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP gateway to the MedBot server,
//! file-backed storage, and configuration file loading.

pub mod config;
pub mod http;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, FileConfig, FileOutputConfig,
    FileReplConfig, FileServerConfig, FileStorageConfig, FileStudyConfig,
};
pub use http::ReqwestMedbotGateway;
pub use storage::FileKeyValueStore;
