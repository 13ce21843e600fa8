//! Locations command - list inventory locations

use anyhow::Result;
use stocktake_backend::InventoryBackend;

use crate::cli::config::{connect, BackendArgs};
use crate::cli::error::HelpfulError;
use crate::cli::output::{or_dash, print_json, print_table};

#[derive(Debug)]
pub struct LocationsArgs {
    pub search: Option<String>,
    pub json: bool,
}

pub async fn run(args: LocationsArgs, backend_args: &BackendArgs) -> Result<()> {
    let (backend, config) = connect(backend_args)?;
    let mut locations = backend
        .list_locations()
        .await
        .map_err(|e| HelpfulError::from_backend(&e, &config.api_url))?;
    if let Some(term) = &args.search {
        locations.retain(|location| location.matches_search(term));
    }

    if args.json {
        return print_json(&locations);
    }

    if locations.is_empty() {
        match &args.search {
            Some(term) => println!("No locations match '{}'.", term),
            None => println!("No locations found."),
        }
        return Ok(());
    }

    let rows = locations
        .iter()
        .map(|location| {
            vec![
                location.id.to_string(),
                location.name.clone(),
                or_dash(location.display_address().as_deref()),
                location
                    .assets_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["ID", "Name", "Address", "Assets"], rows);
    println!("{} location(s)", locations.len());
    Ok(())
}
