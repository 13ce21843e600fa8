//! In-memory inventory backend.
//!
//! Serves a fixed sample data set when no server is reachable, and any
//! caller-supplied data set in tests. Relocations mutate the in-memory
//! records so a refresh after `set_asset_location` observes the move.

use async_trait::async_trait;
use std::time::Duration;
use stocktake_model::{Asset, Location, LocationId, NamedRef};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{BackendError, Result};
use crate::InventoryBackend;

pub struct InMemoryBackend {
    locations: Vec<Location>,
    assets: RwLock<Vec<Asset>>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    pub fn new(locations: Vec<Location>, assets: Vec<Asset>) -> Self {
        Self {
            locations,
            assets: RwLock::new(assets),
            latency: None,
        }
    }

    /// Three locations and three assets: LT001 and MN002 at "Main Office",
    /// SR001 at "Warehouse A", nothing at "Remote Office".
    pub fn sample() -> Self {
        let locations = vec![
            Location::new(1, "Main Office")
                .with_address("123 Business St", "San Francisco", "CA")
                .with_assets_count(45),
            Location::new(2, "Warehouse A")
                .with_address("456 Storage Ave", "Oakland", "CA")
                .with_assets_count(78),
            Location::new(3, "Remote Office")
                .with_address("789 Work Blvd", "Austin", "TX")
                .with_assets_count(23),
        ];
        let assets = vec![
            Asset::new(1, "Dell Laptop #001", "LT001")
                .with_serial("DL123456")
                .with_model(1, "Dell Latitude 7420")
                .with_status(1, "Ready to Deploy", "deployable")
                .with_location(1, "Main Office")
                .with_category(1, "Laptops"),
            Asset::new(2, "Monitor #002", "MN002")
                .with_serial("MN789012")
                .with_model(2, "Dell 24\" Monitor")
                .with_status(1, "Ready to Deploy", "deployable")
                .with_location(1, "Main Office")
                .with_category(2, "Monitors"),
            Asset::new(3, "Server Rack #001", "SR001")
                .with_serial("SR345678")
                .with_model(3, "Dell PowerEdge R730")
                .with_status(2, "Deployed", "deployed")
                .with_location(2, "Warehouse A")
                .with_category(3, "Servers"),
        ];
        Self::new(locations, assets)
    }

    /// Delay every call, to exercise loading states.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::sample()
    }
}

#[async_trait]
impl InventoryBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.simulate_latency().await;
        Ok(self.locations.clone())
    }

    async fn get_location(&self, id: LocationId) -> Result<Location> {
        self.simulate_latency().await;
        self.locations
            .iter()
            .find(|location| location.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("location {}", id)))
    }

    async fn list_assets_at_location(&self, location_id: LocationId) -> Result<Vec<Asset>> {
        self.simulate_latency().await;
        let assets = self.assets.read().await;
        Ok(assets
            .iter()
            .filter(|asset| asset.location_id() == Some(location_id))
            .cloned()
            .collect())
    }

    async fn find_asset_by_tag(&self, tag: &str) -> Result<Asset> {
        self.simulate_latency().await;
        let assets = self.assets.read().await;
        assets
            .iter()
            .find(|asset| asset.asset_tag == tag)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("asset tag '{}'", tag)))
    }

    /// Unknown asset or location ids are accepted and change nothing.
    async fn set_asset_location(&self, asset_id: u64, location_id: LocationId) -> Result<()> {
        self.simulate_latency().await;
        let Some(location) = self.locations.iter().find(|l| l.id == location_id) else {
            debug!(location_id, "relocation target not in sample data; ignoring");
            return Ok(());
        };
        let mut assets = self.assets.write().await;
        if let Some(asset) = assets.iter_mut().find(|asset| asset.id == asset_id) {
            asset.location = Some(NamedRef::new(location.id, location.name.clone()));
        }
        Ok(())
    }
}
