//! Inventory backend collaborators for Stocktake.
//!
//! Provides:
//! - **InventoryBackend**: the contract the session core consumes
//! - **SnipeItBackend**: REST client for a Snipe-IT compatible server
//! - **InMemoryBackend**: deterministic sample data for offline use and tests
//! - **FallbackBackend**: probes the remote once and falls back to memory

use async_trait::async_trait;
use stocktake_model::{Asset, Location, LocationId};

pub mod config;
pub mod error;
pub mod fallback;
pub mod memory;
pub mod snipe_it;

pub use config::BackendConfig;
pub use error::{BackendError, Result};
pub use fallback::FallbackBackend;
pub use memory::InMemoryBackend;
pub use snipe_it::SnipeItBackend;

/// Data access to the remote inventory system.
///
/// Implementations normalize payloads at this boundary; callers only ever
/// see typed `Location` and `Asset` values.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    /// Short tag used in logs ("snipe-it", "memory", ...).
    fn name(&self) -> &'static str;

    async fn list_locations(&self) -> Result<Vec<Location>>;

    async fn get_location(&self, id: LocationId) -> Result<Location>;

    async fn list_assets_at_location(&self, location_id: LocationId) -> Result<Vec<Asset>>;

    /// Fails with [`BackendError::NotFound`] when no asset carries `tag`.
    async fn find_asset_by_tag(&self, tag: &str) -> Result<Asset>;

    async fn set_asset_location(&self, asset_id: u64, location_id: LocationId) -> Result<()>;
}
