//! Progress notification port
//!
//! Defines the interface for reporting progress of non-streamed requests.

/// Callback for progress updates while waiting on the server
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a request is sent
    fn on_request_start(&self, label: &str);

    /// Called when the response arrives (or the request fails)
    fn on_request_end(&self, label: &str, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_request_start(&self, _label: &str) {}
    fn on_request_end(&self, _label: &str, _success: bool) {}
}
