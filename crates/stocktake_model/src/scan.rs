use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// One decoded code in the session scan log.
///
/// `asset` is `None` when the backend lookup failed; such an entry is an
/// unresolved scan, which is valid information rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScannedEntry {
    pub code: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
}

impl ScannedEntry {
    pub fn resolved(code: impl Into<String>, asset: Asset) -> Self {
        Self {
            code: code.into(),
            timestamp: Utc::now(),
            asset: Some(asset),
        }
    }

    pub fn unresolved(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            timestamp: Utc::now(),
            asset: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.asset.is_some()
    }
}
