//! Assets command - list assets registered at a location

use anyhow::Result;
use serde::Serialize;
use stocktake_backend::InventoryBackend;
use stocktake_model::{Asset, Location, LocationId};

use crate::cli::config::{connect, BackendArgs};
use crate::cli::error::HelpfulError;
use crate::cli::output::{or_dash, print_json, print_table};

#[derive(Debug)]
pub struct AssetsArgs {
    pub location_id: LocationId,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AssetsOutput {
    location: Location,
    assets: Vec<Asset>,
}

pub async fn run(args: AssetsArgs, backend_args: &BackendArgs) -> Result<()> {
    let (backend, config) = connect(backend_args)?;
    let helpful = |e| HelpfulError::from_backend(&e, &config.api_url);

    let location = backend.get_location(args.location_id).await.map_err(helpful)?;
    let assets = backend
        .list_assets_at_location(args.location_id)
        .await
        .map_err(helpful)?;

    if args.json {
        return print_json(&AssetsOutput { location, assets });
    }

    println!("{} (location {})", location.name, location.id);
    if assets.is_empty() {
        println!("No assets registered at this location.");
        return Ok(());
    }
    let rows = assets
        .iter()
        .map(|asset| {
            vec![
                asset.asset_tag.clone(),
                asset.name.clone(),
                or_dash(asset.serial.as_deref()),
                or_dash(asset.model.as_ref().map(|m| m.name.as_str())),
                or_dash(asset.status_label.as_ref().map(|s| s.name.as_str())),
            ]
        })
        .collect();
    print_table(&["Tag", "Name", "Serial", "Model", "Status"], rows);
    println!("{} asset(s)", assets.len());
    Ok(())
}
