//! Progress reporting while waiting on the server

pub mod reporter;

pub use reporter::{ProgressReporter, SimpleProgress, waiting_spinner};
