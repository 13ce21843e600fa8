//! Classified differences between registered and observed state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::asset::Asset;

/// Classification of a single discrepancy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyKind {
    Missing,
    Unexpected,
    Match,
}

impl DiscrepancyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::Missing => "missing",
            DiscrepancyKind::Unexpected => "unexpected",
            DiscrepancyKind::Match => "match",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a reconciliation report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Discrepancy {
    /// Registered here, not scanned.
    Missing { asset: Asset },
    /// Registered here and scanned, and the backend agrees it is here.
    Match { asset: Asset },
    /// Scanned but either unknown to the backend (placeholder asset, id 0)
    /// or recorded at another location.
    Unexpected { asset: Asset, scanned_code: String },
}

impl Discrepancy {
    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Discrepancy::Missing { .. } => DiscrepancyKind::Missing,
            Discrepancy::Match { .. } => DiscrepancyKind::Match,
            Discrepancy::Unexpected { .. } => DiscrepancyKind::Unexpected,
        }
    }

    pub fn asset(&self) -> &Asset {
        match self {
            Discrepancy::Missing { asset }
            | Discrepancy::Match { asset }
            | Discrepancy::Unexpected { asset, .. } => asset,
        }
    }

    pub fn scanned_code(&self) -> Option<&str> {
        match self {
            Discrepancy::Unexpected { scanned_code, .. } => Some(scanned_code.as_str()),
            _ => None,
        }
    }

    /// Whether "move to this location" applies: only real assets that
    /// turned up somewhere they are not registered.
    pub fn can_relocate(&self) -> bool {
        matches!(self, Discrepancy::Unexpected { asset, .. } if !asset.is_unknown())
    }
}

/// Tallies over a discrepancy list. Always derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyCounts {
    pub scanned: usize,
    pub matches: usize,
    pub missing: usize,
    pub unexpected: usize,
}

impl DiscrepancyCounts {
    pub fn tally(discrepancies: &[Discrepancy], scanned: usize) -> Self {
        discrepancies.iter().fold(
            Self {
                scanned,
                ..Self::default()
            },
            |mut counts, discrepancy| {
                match discrepancy.kind() {
                    DiscrepancyKind::Missing => counts.missing += 1,
                    DiscrepancyKind::Unexpected => counts.unexpected += 1,
                    DiscrepancyKind::Match => counts.matches += 1,
                }
                counts
            },
        )
    }

    /// True when every registered asset was found and nothing extra turned up.
    pub fn is_clean(&self) -> bool {
        self.missing == 0 && self.unexpected == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization() {
        let entry = Discrepancy::Unexpected {
            asset: Asset::unknown("XYZ"),
            scanned_code: "XYZ".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "unexpected");
        assert_eq!(json["scanned_code"], "XYZ");
        assert_eq!(json["asset"]["id"], 0);

        let json = serde_json::to_value(Discrepancy::Match {
            asset: Asset::new(1, "Laptop", "LT001"),
        })
        .unwrap();
        assert_eq!(json["type"], "match");
    }

    #[test]
    fn test_can_relocate() {
        let unknown = Discrepancy::Unexpected {
            asset: Asset::unknown("XYZ"),
            scanned_code: "XYZ".to_string(),
        };
        let elsewhere = Discrepancy::Unexpected {
            asset: Asset::new(3, "Server", "SR001").with_location(2, "Warehouse A"),
            scanned_code: "SR001".to_string(),
        };
        let missing = Discrepancy::Missing {
            asset: Asset::new(1, "Laptop", "LT001"),
        };
        assert!(!unknown.can_relocate());
        assert!(elsewhere.can_relocate());
        assert!(!missing.can_relocate());
        assert_eq!(elsewhere.scanned_code(), Some("SR001"));
        assert_eq!(missing.scanned_code(), None);
    }

    #[test]
    fn test_tally() {
        let list = vec![
            Discrepancy::Missing {
                asset: Asset::new(1, "Laptop", "LT001"),
            },
            Discrepancy::Match {
                asset: Asset::new(2, "Monitor", "MN002"),
            },
            Discrepancy::Unexpected {
                asset: Asset::unknown("XYZ"),
                scanned_code: "XYZ".to_string(),
            },
        ];
        let counts = DiscrepancyCounts::tally(&list, 2);
        assert_eq!(
            counts,
            DiscrepancyCounts {
                scanned: 2,
                matches: 1,
                missing: 1,
                unexpected: 1,
            }
        );
        assert!(!counts.is_clean());
        assert!(DiscrepancyCounts::tally(&[], 0).is_clean());
    }
}
