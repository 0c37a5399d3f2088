//! Server configuration from TOML (`[server]` section)

use medbot_application::EndpointPaths;
use medbot_domain::{ConfigIssue, ConfigIssueCode};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw server configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Backend base URL, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Timeout for non-streamed requests
    pub timeout_secs: u64,
    /// Per-endpoint path overrides (`[server.endpoints]`)
    pub endpoints: EndpointPaths,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: EndpointPaths::default(),
        }
    }
}

impl FileServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Parse the base URL, returning an issue if it is unusable.
    pub fn parse_base_url(&self) -> (Option<Url>, Vec<ConfigIssue>) {
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => (Some(url), Vec::new()),
            _ => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidBaseUrl {
                        value: self.base_url.clone(),
                    },
                    format!(
                        "server.base_url: '{}' is not an absolute http(s) URL",
                        self.base_url
                    ),
                )],
            ),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_base_url().1;

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "server.timeout_secs".to_string(),
                },
                "server.timeout_secs is 0, using 1 second",
            ));
        }

        for (name, path) in self.endpoints.entries() {
            if path.is_empty() || !path.starts_with('/') {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEndpoint {
                        field: format!("server.endpoints.{name}"),
                        value: path.to_string(),
                    },
                    format!("server.endpoints.{name}: '{path}' should start with '/'"),
                ));
            }
        }

        issues
    }
}
