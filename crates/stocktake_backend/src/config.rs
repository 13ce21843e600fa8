//! Backend connection settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How to reach the inventory server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Server base URL; endpoints are appended as `/api/v1/...`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token. Empty means the remote is never contacted.
    #[serde(default)]
    pub api_token: String,

    /// Force the in-memory backend.
    #[serde(default)]
    pub use_mock: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
            use_mock: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Whether the in-memory backend must be used without probing.
    pub fn wants_mock(&self) -> bool {
        self.use_mock || self.api_token.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
