//! Ordered, de-duplicated record of scanned codes.

use serde::Serialize;
use std::collections::HashSet;
use stocktake_model::{NamedRef, ScannedEntry};

/// Result of feeding one code to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// New entry appended to the log.
    Appended(ScannedEntry),
    /// Code already present; nothing changed.
    Duplicate,
    /// Empty code; nothing changed.
    Ignored,
}

impl IngestOutcome {
    pub fn entry(&self) -> Option<&ScannedEntry> {
        match self {
            IngestOutcome::Appended(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_appended(&self) -> bool {
        matches!(self, IngestOutcome::Appended(_))
    }
}

/// Scan entries in arrival order. Each code appears at most once.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ScanLog {
    entries: Vec<ScannedEntry>,
    #[serde(skip)]
    codes: HashSet<String>,
}

impl ScanLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Append unless the code is already present. Returns whether the entry
    /// was added.
    pub fn append(&mut self, entry: ScannedEntry) -> bool {
        if !self.codes.insert(entry.code.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[ScannedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.codes.clear();
    }

    /// Point every resolved entry for `asset_id` at `location`. Returns the
    /// number of entries updated.
    pub fn relocate_asset(&mut self, asset_id: u64, location: NamedRef) -> usize {
        let mut updated = 0;
        for asset in self.entries.iter_mut().filter_map(|e| e.asset.as_mut()) {
            if asset.id == asset_id && !asset.is_unknown() {
                asset.location = Some(location.clone());
                updated += 1;
            }
        }
        updated
    }
}
