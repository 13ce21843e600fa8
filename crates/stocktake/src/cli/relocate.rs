//! Relocate command - move one asset's record to a location

use anyhow::Result;
use stocktake_backend::InventoryBackend;
use stocktake_model::LocationId;
use tracing::info;

use crate::cli::config::{connect, BackendArgs};
use crate::cli::error::HelpfulError;

#[derive(Debug)]
pub struct RelocateArgs {
    pub asset_id: u64,
    pub location_id: LocationId,
}

pub async fn run(args: RelocateArgs, backend_args: &BackendArgs) -> Result<()> {
    if args.asset_id == stocktake_model::UNKNOWN_ASSET_ID {
        return Err(HelpfulError::new("Asset id 0 is not a real asset")
            .with_suggestion("TRY: Look up the id with: stocktake assets <location-id>")
            .into());
    }

    let (backend, config) = connect(backend_args)?;
    let location = backend
        .list_locations()
        .await
        .map_err(|e| HelpfulError::from_backend(&e, &config.api_url))?
        .into_iter()
        .find(|location| location.id == args.location_id)
        .ok_or_else(|| HelpfulError::location_not_found(args.location_id))?;
    backend
        .set_asset_location(args.asset_id, args.location_id)
        .await
        .map_err(|e| HelpfulError::from_backend(&e, &config.api_url))?;

    info!(asset_id = args.asset_id, location_id = args.location_id, "asset relocated");
    println!(
        "Moved asset {} to {} (location {})",
        args.asset_id, location.name, location.id
    );
    Ok(())
}
