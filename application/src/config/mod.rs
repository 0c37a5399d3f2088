//! Application-level configuration.
//!
//! - [`EndpointPaths`]: where each server call goes
//! - [`StudyDefaults`]: fallback values for study tool requests

pub mod endpoints;
pub mod study_defaults;

pub use endpoints::{ALL_ENDPOINTS, Endpoint, EndpointPaths};
pub use study_defaults::{DIFFICULTIES, StudyDefaults};
