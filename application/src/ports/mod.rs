//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation
//! adapters must implement.

pub mod medbot_gateway;
pub mod progress;
pub mod storage;
pub mod stream_renderer;
