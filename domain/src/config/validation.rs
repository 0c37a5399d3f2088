//! Configuration validation issues.
//!
//! Config loaders in the infrastructure layer report problems with the
//! user's configuration as structured [`ConfigIssue`]s so the binary can
//! decide whether to print a warning or abort.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// The backend base URL is not an absolute http(s) URL.
    InvalidBaseUrl { value: String },
    /// An endpoint path is empty or does not start with `/`.
    InvalidEndpoint { field: String, value: String },
    /// A numeric field must be greater than zero.
    ZeroValue { field: String },
    /// A string field holds a value outside its accepted set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
