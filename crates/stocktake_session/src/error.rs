//! Session errors.

use stocktake_backend::BackendError;
use stocktake_model::LocationId;
use thiserror::Error;

use crate::capture::CaptureError;
use crate::state::SessionState;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("inventory is not active; start the inventory before scanning or relocating")]
    NotActive,

    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition { from: SessionState, to: SessionState },

    #[error("asset {asset_id} is not part of this session's scans")]
    UnknownAsset { asset_id: u64 },

    #[error("failed to load assets for location {location_id}: {source}")]
    Fetch {
        location_id: LocationId,
        #[source]
        source: BackendError,
    },

    #[error("failed to relocate asset {asset_id}: {source}")]
    Remote {
        asset_id: u64,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl SessionError {
    /// Errors a user can retry without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Fetch { .. } | SessionError::Remote { .. })
    }
}
