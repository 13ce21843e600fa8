//! Snapshot vs scan log diff.

use std::collections::HashSet;
use stocktake_model::{Asset, Discrepancy, LocationId, ScannedEntry};

/// Classify every registered asset and every scan.
///
/// Registered assets come first in snapshot order (match or missing), then
/// scans in arrival order for those that are unresolved or resolve to an
/// asset recorded at another location. A scan only confirms a registered
/// asset when the resolved record is at `location_id`, so a wrong-location
/// scan leaves the registered copy missing and surfaces as unexpected.
///
/// Pure: no I/O, same inputs give the same output.
pub fn reconcile(
    registered: &[Asset],
    scan_log: &[ScannedEntry],
    location_id: LocationId,
) -> Vec<Discrepancy> {
    let confirmed: HashSet<&str> = scan_log
        .iter()
        .filter_map(|entry| entry.asset.as_ref())
        .filter(|asset| asset.location_id() == Some(location_id))
        .map(|asset| asset.asset_tag.as_str())
        .collect();

    let mut discrepancies = Vec::with_capacity(registered.len() + scan_log.len());

    for asset in registered {
        let asset = asset.clone();
        if confirmed.contains(asset.asset_tag.as_str()) {
            discrepancies.push(Discrepancy::Match { asset });
        } else {
            discrepancies.push(Discrepancy::Missing { asset });
        }
    }

    for entry in scan_log {
        match &entry.asset {
            None => discrepancies.push(Discrepancy::Unexpected {
                asset: Asset::unknown(entry.code.clone()),
                scanned_code: entry.code.clone(),
            }),
            Some(asset) if asset.location_id() != Some(location_id) => {
                discrepancies.push(Discrepancy::Unexpected {
                    asset: asset.clone(),
                    scanned_code: entry.code.clone(),
                })
            }
            // Here and either registered (already a match) or not yet in the snapshot.
            Some(_) => {}
        }
    }

    discrepancies
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_model::{DiscrepancyCounts, DiscrepancyKind};

    const HERE: LocationId = 1;

    fn laptop() -> Asset {
        Asset::new(1, "Dell Laptop #001", "LT001").with_location(HERE, "Main Office")
    }

    fn monitor() -> Asset {
        Asset::new(2, "Monitor #002", "MN002").with_location(HERE, "Main Office")
    }

    fn server_elsewhere() -> Asset {
        Asset::new(3, "Server Rack #001", "SR001").with_location(2, "Warehouse A")
    }

    fn kinds(discrepancies: &[Discrepancy]) -> Vec<(DiscrepancyKind, &str)> {
        discrepancies
            .iter()
            .map(|d| (d.kind(), d.asset().asset_tag.as_str()))
            .collect()
    }

    #[test]
    fn test_nothing_scanned_all_missing() {
        let result = reconcile(&[laptop(), monitor()], &[], HERE);
        assert_eq!(
            kinds(&result),
            vec![
                (DiscrepancyKind::Missing, "LT001"),
                (DiscrepancyKind::Missing, "MN002")
            ]
        );
    }

    #[test]
    fn test_scanned_here_is_match() {
        let scans = vec![ScannedEntry::resolved("LT001", laptop())];
        let result = reconcile(&[laptop()], &scans, HERE);
        assert_eq!(kinds(&result), vec![(DiscrepancyKind::Match, "LT001")]);
    }

    #[test]
    fn test_unresolved_scan_is_unexpected_placeholder() {
        let scans = vec![ScannedEntry::unresolved("XYZ")];
        let result = reconcile(&[], &scans, HERE);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind(), DiscrepancyKind::Unexpected);
        assert!(result[0].asset().is_unknown());
        assert_eq!(result[0].asset().name, "Unknown Asset");
        assert_eq!(result[0].scanned_code(), Some("XYZ"));
        assert!(!result[0].can_relocate());
    }

    #[test]
    fn test_wrong_location_is_missing_and_unexpected() {
        let mut registered = server_elsewhere();
        registered.location = laptop().location;
        let scans = vec![ScannedEntry::resolved("SR001", server_elsewhere())];

        let result = reconcile(&[registered], &scans, HERE);
        assert_eq!(
            kinds(&result),
            vec![
                (DiscrepancyKind::Missing, "SR001"),
                (DiscrepancyKind::Unexpected, "SR001")
            ]
        );
        assert!(result[1].can_relocate());
        let counts = DiscrepancyCounts::tally(&result, scans.len());
        assert_eq!(counts.matches, 0);
    }

    #[test]
    fn test_located_here_but_not_registered_yields_nothing() {
        let stray = Asset::new(9, "Dock", "DK009").with_location(HERE, "Main Office");
        let scans = vec![ScannedEntry::resolved("DK009", stray)];
        assert!(reconcile(&[laptop()], &scans, HERE)
            .iter()
            .all(|d| d.kind() == DiscrepancyKind::Missing));
    }

    #[test]
    fn test_asset_without_location_is_unexpected() {
        let mut floating = laptop();
        floating.location = None;
        let scans = vec![ScannedEntry::resolved("LT001", floating)];
        let result = reconcile(&[laptop()], &scans, HERE);
        assert_eq!(
            kinds(&result),
            vec![
                (DiscrepancyKind::Missing, "LT001"),
                (DiscrepancyKind::Unexpected, "LT001")
            ]
        );
    }

    #[test]
    fn test_order_registered_then_scans() {
        let scans = vec![
            ScannedEntry::unresolved("AAA"),
            ScannedEntry::resolved("MN002", monitor()),
            ScannedEntry::unresolved("BBB"),
        ];
        let result = reconcile(&[laptop(), monitor()], &scans, HERE);
        let codes: Vec<Option<&str>> = result.iter().map(|d| d.scanned_code()).collect();
        assert_eq!(codes, vec![None, None, Some("AAA"), Some("BBB")]);
        assert_eq!(result[1].kind(), DiscrepancyKind::Match);
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let scans = vec![
            ScannedEntry::resolved("SR001", server_elsewhere()),
            ScannedEntry::unresolved("XYZ"),
        ];
        let registered = vec![laptop(), monitor()];
        assert_eq!(
            reconcile(&registered, &scans, HERE),
            reconcile(&registered, &scans, HERE)
        );
    }
}
