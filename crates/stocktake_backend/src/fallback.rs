//! Backend selection with a one-time reachability probe.
//!
//! The remote backend is probed with `list_locations` on first use. The
//! outcome is cached for the lifetime of the value, so a process decides
//! once and sticks with it.

use async_trait::async_trait;
use std::sync::Arc;
use stocktake_model::{Asset, Location, LocationId};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::memory::InMemoryBackend;
use crate::snipe_it::SnipeItBackend;
use crate::InventoryBackend;

pub struct FallbackBackend {
    remote: Option<Arc<dyn InventoryBackend>>,
    fallback: Arc<dyn InventoryBackend>,
    remote_available: OnceCell<bool>,
}

impl FallbackBackend {
    /// Remote when a token is configured and `use_mock` is off, with the
    /// sample in-memory backend behind it.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let fallback: Arc<dyn InventoryBackend> = Arc::new(InMemoryBackend::sample());
        if config.wants_mock() {
            info!("using in-memory inventory backend");
            return Ok(Self::memory_only(fallback));
        }
        let remote: Arc<dyn InventoryBackend> = Arc::new(SnipeItBackend::new(config)?);
        Ok(Self::new(remote, fallback))
    }

    pub fn new(remote: Arc<dyn InventoryBackend>, fallback: Arc<dyn InventoryBackend>) -> Self {
        Self {
            remote: Some(remote),
            fallback,
            remote_available: OnceCell::new(),
        }
    }

    pub fn memory_only(fallback: Arc<dyn InventoryBackend>) -> Self {
        Self {
            remote: None,
            fallback,
            remote_available: OnceCell::new(),
        }
    }

    /// Backend serving requests, probing the remote on first call.
    pub async fn active(&self) -> &dyn InventoryBackend {
        let Some(remote) = &self.remote else {
            return self.fallback.as_ref();
        };
        let available = *self
            .remote_available
            .get_or_init(|| async {
                match remote.list_locations().await {
                    Ok(_) => {
                        info!(backend = remote.name(), "inventory server reachable");
                        true
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            "inventory server unavailable, falling back to {}",
                            self.fallback.name()
                        );
                        false
                    }
                }
            })
            .await;
        if available {
            remote.as_ref()
        } else {
            self.fallback.as_ref()
        }
    }

    /// Whether the probe has run and chose the remote. `None` before the
    /// first request.
    pub fn remote_selected(&self) -> Option<bool> {
        if self.remote.is_none() {
            return Some(false);
        }
        self.remote_available.get().copied()
    }
}

#[async_trait]
impl InventoryBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.active().await.list_locations().await
    }

    async fn get_location(&self, id: LocationId) -> Result<Location> {
        match self.active().await.get_location(id).await {
            Err(BackendError::NotFound(_)) => Ok(Location::placeholder(id)),
            other => other,
        }
    }

    async fn list_assets_at_location(&self, location_id: LocationId) -> Result<Vec<Asset>> {
        self.active().await.list_assets_at_location(location_id).await
    }

    async fn find_asset_by_tag(&self, tag: &str) -> Result<Asset> {
        self.active().await.find_asset_by_tag(tag).await
    }

    async fn set_asset_location(&self, asset_id: u64, location_id: LocationId) -> Result<()> {
        self.active()
            .await
            .set_asset_location(asset_id, location_id)
            .await
    }
}
