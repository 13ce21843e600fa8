//! End-to-end inventory flows against an in-memory backend.
//!
//! Covers the reconciliation scenarios (nothing scanned, clean match,
//! unknown code, wrong location, relocation) and the failure paths of
//! loading and relocating.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use stocktake_backend::{BackendError, InMemoryBackend, InventoryBackend, Result};
use stocktake_model::{Asset, DiscrepancyKind, Location, LocationId};
use std::time::Duration;
use stocktake_session::{IngestOutcome, InventorySession, SessionError, SessionState, SharedSession};

/// In-memory backend with switchable failures and a lookup counter.
struct ScriptedBackend {
    inner: InMemoryBackend,
    fail_listing: AtomicBool,
    fail_updates: AtomicBool,
    fail_lookups: AtomicBool,
    lookups: AtomicUsize,
}

impl ScriptedBackend {
    fn sample() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryBackend::sample(),
            fail_listing: AtomicBool::new(false),
            fail_updates: AtomicBool::new(false),
            fail_lookups: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
        })
    }

    fn unreachable() -> BackendError {
        BackendError::Unreachable("connection refused".to_string())
    }
}

#[async_trait]
impl InventoryBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.inner.list_locations().await
    }

    async fn get_location(&self, id: LocationId) -> Result<Location> {
        self.inner.get_location(id).await
    }

    async fn list_assets_at_location(&self, location_id: LocationId) -> Result<Vec<Asset>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Self::unreachable());
        }
        self.inner.list_assets_at_location(location_id).await
    }

    async fn find_asset_by_tag(&self, tag: &str) -> Result<Asset> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Self::unreachable());
        }
        self.inner.find_asset_by_tag(tag).await
    }

    async fn set_asset_location(&self, asset_id: u64, location_id: LocationId) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(BackendError::Remote {
                status: 422,
                message: "location invalid".to_string(),
            });
        }
        self.inner.set_asset_location(asset_id, location_id).await
    }
}

async fn active_session(backend: Arc<ScriptedBackend>, location_id: LocationId) -> InventorySession {
    let location = backend.get_location(location_id).await.unwrap();
    let mut session = InventorySession::new(backend, location);
    session.load().await.unwrap();
    session.start().unwrap();
    session
}

fn summary(session: &InventorySession) -> Vec<(DiscrepancyKind, String)> {
    session
        .discrepancies()
        .iter()
        .map(|d| (d.kind(), d.asset().asset_tag.clone()))
        .collect()
}

#[tokio::test]
async fn test_nothing_scanned_everything_missing() {
    let session = active_session(ScriptedBackend::sample(), 1).await;
    assert_eq!(
        summary(&session),
        vec![
            (DiscrepancyKind::Missing, "LT001".to_string()),
            (DiscrepancyKind::Missing, "MN002".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_scanned_registered_asset_matches() {
    let mut session = active_session(ScriptedBackend::sample(), 1).await;
    session.ingest("LT001").await.unwrap();
    assert_eq!(
        summary(&session),
        vec![
            (DiscrepancyKind::Match, "LT001".to_string()),
            (DiscrepancyKind::Missing, "MN002".to_string()),
        ]
    );
    let counts = session.counts();
    assert_eq!((counts.scanned, counts.matches, counts.missing), (1, 1, 1));
}

#[tokio::test]
async fn test_unknown_code_is_unexpected_placeholder() {
    let mut session = active_session(ScriptedBackend::sample(), 3).await;
    let outcome = session.ingest("XYZ").await.unwrap();
    let entry = outcome.entry().unwrap();
    assert!(!entry.is_resolved());

    let discrepancies = session.discrepancies();
    assert_eq!(discrepancies.len(), 1);
    assert_eq!(discrepancies[0].kind(), DiscrepancyKind::Unexpected);
    assert_eq!(discrepancies[0].scanned_code(), Some("XYZ"));
    assert_eq!(discrepancies[0].asset().id, 0);
}

#[tokio::test]
async fn test_lookup_failure_records_unresolved_scan() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    backend.fail_lookups.store(true, Ordering::SeqCst);

    assert!(session.ingest("LT001").await.unwrap().is_appended());
    assert!(!session.scans()[0].is_resolved());
    assert_eq!(session.counts().unexpected, 1);
    assert_eq!(session.counts().missing, 2);
}

#[tokio::test]
async fn test_wrong_location_counts_as_missing_and_unexpected() {
    // SR001 is registered at Warehouse A; register a copy here by moving it
    // in the backend after the snapshot was taken.
    let backend = ScriptedBackend::sample();
    backend.inner.set_asset_location(3, 1).await.unwrap();
    let mut session = active_session(backend.clone(), 1).await;
    backend.inner.set_asset_location(3, 2).await.unwrap();

    session.ingest("SR001").await.unwrap();
    let result = summary(&session);
    assert!(result.contains(&(DiscrepancyKind::Missing, "SR001".to_string())));
    assert!(result.contains(&(DiscrepancyKind::Unexpected, "SR001".to_string())));
    assert!(!result.contains(&(DiscrepancyKind::Match, "SR001".to_string())));
}

#[tokio::test]
async fn test_relocate_turns_unexpected_into_match() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    session.ingest("SR001").await.unwrap();
    assert_eq!(session.counts().unexpected, 1);

    session.relocate(3).await.unwrap();

    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.registered().len(), 3);
    assert_eq!(session.counts().unexpected, 0);
    assert!(summary(&session).contains(&(DiscrepancyKind::Match, "SR001".to_string())));
    let moved = backend.find_asset_by_tag("SR001").await.unwrap();
    assert_eq!(moved.location_id(), Some(1));
}

#[tokio::test]
async fn test_failed_relocation_changes_nothing() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    session.ingest("SR001").await.unwrap();
    let before = session.discrepancies().to_vec();
    backend.fail_updates.store(true, Ordering::SeqCst);

    let err = session.relocate(3).await.unwrap_err();
    assert!(matches!(err, SessionError::Remote { asset_id: 3, .. }));
    assert!(err.is_retryable());
    assert_eq!(session.discrepancies(), before.as_slice());
    assert_eq!(session.state(), SessionState::Active);
}

#[tokio::test]
async fn test_relocation_refetch_failure_leaves_session_untouched() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    session.ingest("SR001").await.unwrap();
    let discrepancies = session.discrepancies().to_vec();
    let scans = session.scans().to_vec();
    backend.fail_listing.store(true, Ordering::SeqCst);

    let err = session.relocate(3).await.unwrap_err();
    assert!(matches!(err, SessionError::Fetch { location_id: 1, .. }));
    assert!(err.is_retryable());
    assert_eq!(session.registered().len(), 2);
    assert_eq!(session.scans(), scans.as_slice());
    assert_eq!(session.discrepancies(), discrepancies.as_slice());
    assert_eq!(session.counts().unexpected, 1);

    // Retrying once the backend recovers completes the relocation.
    backend.fail_listing.store(false, Ordering::SeqCst);
    session.relocate(3).await.unwrap();
    assert_eq!(session.counts().unexpected, 0);
    assert_eq!(session.counts().matches, 1);
}

#[tokio::test]
async fn test_relocate_rejects_placeholder_and_unscanned_ids() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    session.ingest("XYZ").await.unwrap();

    assert!(matches!(
        session.relocate(0).await.unwrap_err(),
        SessionError::UnknownAsset { asset_id: 0 }
    ));
    assert!(matches!(
        session.relocate(3).await.unwrap_err(),
        SessionError::UnknownAsset { asset_id: 3 }
    ));
}

#[tokio::test]
async fn test_duplicate_scan_skips_backend() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    session.ingest("LT001").await.unwrap();
    let before = session.discrepancies().to_vec();

    assert_eq!(session.ingest("LT001").await.unwrap(), IngestOutcome::Duplicate);
    assert_eq!(backend.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(session.discrepancies(), before.as_slice());
    assert_eq!(session.scans().len(), 1);
}

#[tokio::test]
async fn test_failed_first_load_leaves_empty_ready_session() {
    let backend = ScriptedBackend::sample();
    backend.fail_listing.store(true, Ordering::SeqCst);
    let mut session = InventorySession::new(backend.clone(), Location::new(1, "Main Office"));

    let err = session.load().await.unwrap_err();
    assert!(matches!(err, SessionError::Fetch { .. }));
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.registered().is_empty());

    backend.fail_listing.store(false, Ordering::SeqCst);
    assert_eq!(session.refresh().await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_prior_snapshot() {
    let backend = ScriptedBackend::sample();
    let mut session = active_session(backend.clone(), 1).await;
    session.ingest("MN002").await.unwrap();
    backend.fail_listing.store(true, Ordering::SeqCst);

    assert!(session.refresh().await.is_err());
    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.registered().len(), 2);
    assert_eq!(session.scans().len(), 1);
    assert_eq!(session.counts().matches, 1);
}

#[tokio::test]
async fn test_partition_of_registered_assets() {
    let mut session = active_session(ScriptedBackend::sample(), 1).await;
    for code in ["MN002", "XYZ", "SR001", "MN002"] {
        session.ingest(code).await.unwrap();
    }
    let counts = session.counts();
    assert_eq!(counts.missing + counts.matches, session.registered().len());
    assert_eq!(counts.unexpected, 2);
    assert_eq!(counts.scanned, 3);

    let history: Vec<SessionState> = session.history().iter().map(|t| t.to).collect();
    assert_eq!(
        history,
        vec![SessionState::Loading, SessionState::Ready, SessionState::Active]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shared_session_appends_concurrent_duplicate_once() {
    let backend = Arc::new(InMemoryBackend::sample().with_latency(Duration::from_millis(20)));
    let mut session = InventorySession::new(backend, Location::new(1, "Main Office"));
    session.load().await.unwrap();
    session.start().unwrap();
    let shared: SharedSession = session.into_shared();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let shared = shared.clone();
            tokio::spawn(async move { shared.lock().await.ingest("LT001").await.unwrap() })
        })
        .collect();
    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    assert_eq!(outcomes.iter().filter(|o| o.is_appended()).count(), 1);
    assert!(outcomes.contains(&IngestOutcome::Duplicate));
    let session = shared.lock().await;
    assert_eq!(session.scans().len(), 1);
    assert_eq!(session.counts().matches, 1);
}
