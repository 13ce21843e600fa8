//! Inventory session for a single location.
//!
//! Owns the registered-asset snapshot, the scan log and the derived
//! discrepancy list. Every mutation takes `&mut self`, so one mutation
//! settles (including reconciliation) before the next is accepted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use stocktake_backend::InventoryBackend;
use stocktake_model::{
    Asset, Discrepancy, DiscrepancyCounts, Location, NamedRef, ScannedEntry, SessionId,
    UNKNOWN_ASSET_ID,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::reconcile::reconcile;
use crate::scan_log::{IngestOutcome, ScanLog};
use crate::state::{SessionState, StateMachine, StateTransition};

/// A session shared between tasks. The lock is held for a whole mutation.
pub type SharedSession = Arc<Mutex<InventorySession>>;

pub struct InventorySession {
    id: SessionId,
    backend: Arc<dyn InventoryBackend>,
    location: Location,
    machine: StateMachine,
    /// State to settle in once the in-flight fetch finishes.
    resume_to: SessionState,
    registered: Vec<Asset>,
    scan_log: ScanLog,
    discrepancies: Vec<Discrepancy>,
    started_at: Option<DateTime<Utc>>,
}

impl InventorySession {
    /// New idle session. Call [`load`](Self::load) to fetch the snapshot.
    pub fn new(backend: Arc<dyn InventoryBackend>, location: Location) -> Self {
        Self {
            id: SessionId::new(),
            backend,
            location,
            machine: StateMachine::new(),
            resume_to: SessionState::Ready,
            registered: Vec::new(),
            scan_log: ScanLog::new(),
            discrepancies: Vec::new(),
            started_at: None,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Fetch the registered-asset snapshot for this location.
    ///
    /// Settles in `Ready`, or back in `Active` when called mid-inventory (the
    /// scan log is kept and discrepancies recomputed). On failure the
    /// previous snapshot, if any, stays in place and the error is returned.
    pub async fn load(&mut self) -> Result<usize> {
        let current = self.state();
        self.machine.transition(SessionState::Loading, "load snapshot")?;
        if current != SessionState::Loading {
            self.resume_to = if current.is_active() {
                SessionState::Active
            } else {
                SessionState::Ready
            };
        }

        let location_id = self.location.id;
        let fetched = self.backend.list_assets_at_location(location_id).await;
        let resume_to = self.resume_to;

        match fetched {
            Ok(assets) => {
                let count = assets.len();
                self.registered = assets;
                self.machine.transition(resume_to, "snapshot loaded")?;
                info!(
                    session_id = %self.id,
                    location_id,
                    assets = count,
                    backend = self.backend.name(),
                    "loaded registered assets"
                );
                self.recompute();
                Ok(count)
            }
            Err(source) => {
                warn!(
                    session_id = %self.id,
                    location_id,
                    error = %source,
                    kept = self.registered.len(),
                    "failed to load registered assets"
                );
                self.machine.transition(resume_to, "snapshot fetch failed")?;
                self.recompute();
                Err(SessionError::Fetch {
                    location_id,
                    source,
                })
            }
        }
    }

    /// Re-fetch the snapshot. Same semantics as [`load`](Self::load).
    pub async fn refresh(&mut self) -> Result<usize> {
        self.load().await
    }

    /// Begin scanning. Clears any previous scans; every registered asset
    /// starts out missing.
    pub fn start(&mut self) -> Result<()> {
        self.machine
            .transition(SessionState::Active, "start inventory")?;
        self.scan_log.clear();
        self.started_at = Some(Utc::now());
        self.recompute();
        info!(
            session_id = %self.id,
            location_id = self.location.id,
            registered = self.registered.len(),
            "inventory started"
        );
        Ok(())
    }

    /// Abandon the current scans and return to `Ready`. The snapshot is kept.
    pub fn reset(&mut self) -> Result<()> {
        self.machine.transition(SessionState::Ready, "reset inventory")?;
        let dropped = self.scan_log.len();
        self.scan_log.clear();
        self.discrepancies.clear();
        self.started_at = None;
        info!(session_id = %self.id, dropped_scans = dropped, "inventory reset");
        Ok(())
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    /// Record one decoded code.
    ///
    /// Codes are compared exactly as decoded; sources such as
    /// [`LineCapture`](crate::LineCapture) trim their input. Lookup
    /// failures of any kind become unresolved entries rather than errors.
    /// The append is the linearization point for duplicates.
    pub async fn ingest(&mut self, code: &str) -> Result<IngestOutcome> {
        if !self.state().is_active() {
            return Err(SessionError::NotActive);
        }
        if code.is_empty() {
            return Ok(IngestOutcome::Ignored);
        }
        if self.scan_log.contains(code) {
            debug!(code, "duplicate scan ignored");
            return Ok(IngestOutcome::Duplicate);
        }

        let entry = match self.backend.find_asset_by_tag(code).await {
            Ok(asset) => {
                debug!(code, asset_id = asset.id, location_id = ?asset.location_id(), "scan resolved");
                ScannedEntry::resolved(code, asset)
            }
            Err(err) if err.is_not_found() => {
                debug!(code, "scan did not match any asset");
                ScannedEntry::unresolved(code)
            }
            Err(err) => {
                warn!(code, error = %err, "asset lookup failed; recording scan as unresolved");
                ScannedEntry::unresolved(code)
            }
        };

        if !self.scan_log.append(entry.clone()) {
            return Ok(IngestOutcome::Duplicate);
        }
        self.recompute();
        Ok(IngestOutcome::Appended(entry))
    }

    /// Move a scanned asset's backend record to this session's location.
    ///
    /// On success the snapshot is re-fetched and the cached scan entries for
    /// the asset are pointed here, so its unexpected entry becomes a match.
    /// If either request fails the scan log, snapshot and discrepancies are
    /// left untouched.
    pub async fn relocate(&mut self, asset_id: u64) -> Result<()> {
        if !self.state().is_active() {
            return Err(SessionError::NotActive);
        }
        let scanned = self
            .scan_log
            .entries()
            .iter()
            .filter_map(|entry| entry.asset.as_ref())
            .any(|asset| asset.id == asset_id);
        if asset_id == UNKNOWN_ASSET_ID || !scanned {
            return Err(SessionError::UnknownAsset { asset_id });
        }

        let location_id = self.location.id;
        self.backend
            .set_asset_location(asset_id, location_id)
            .await
            .map_err(|source| {
                warn!(asset_id, location_id, error = %source, "relocation rejected");
                SessionError::Remote { asset_id, source }
            })?;
        info!(session_id = %self.id, asset_id, location_id, "asset relocated");

        let assets = self
            .backend
            .list_assets_at_location(location_id)
            .await
            .map_err(|source| {
                warn!(location_id, error = %source, "refresh after relocation failed");
                SessionError::Fetch {
                    location_id,
                    source,
                }
            })?;

        self.registered = assets;
        self.scan_log.relocate_asset(
            asset_id,
            NamedRef::new(location_id, self.location.name.clone()),
        );
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        if !self.state().is_active() {
            return;
        }
        self.discrepancies = reconcile(
            &self.registered,
            self.scan_log.entries(),
            self.location.id,
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.machine.current()
    }

    pub fn history(&self) -> &[StateTransition] {
        self.machine.history()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn registered(&self) -> &[Asset] {
        &self.registered
    }

    pub fn scans(&self) -> &[ScannedEntry] {
        self.scan_log.entries()
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    pub fn counts(&self) -> DiscrepancyCounts {
        DiscrepancyCounts::tally(&self.discrepancies, self.scan_log.len())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn report(&self) -> SessionReport<'_> {
        SessionReport {
            session_id: self.id,
            location: &self.location,
            state: self.state(),
            started_at: self.started_at,
            counts: self.counts(),
            discrepancies: &self.discrepancies,
            scans: self.scan_log.entries(),
        }
    }
}

/// Serializable view of a session's current results.
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub session_id: SessionId,
    pub location: &'a Location,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub counts: DiscrepancyCounts,
    pub discrepancies: &'a [Discrepancy],
    pub scans: &'a [ScannedEntry],
}
