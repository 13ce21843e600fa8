//! Reconcile command - diff saved snapshots without a server
//!
//! `--registered` holds the assets registered at the location (a plain array
//! or a `{"total", "rows"}` page as the server returns it). `--scans` holds
//! scan entries as written by `inventory --json`.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stocktake_model::{Asset, Discrepancy, DiscrepancyCounts, LocationId, Page, ScannedEntry};
use stocktake_session::{reconcile, ScanLog};

use crate::cli::error::HelpfulError;
use crate::cli::output::{print_discrepancies, print_json};

#[derive(Debug)]
pub struct ReconcileArgs {
    pub registered: PathBuf,
    pub scans: PathBuf,
    pub location_id: LocationId,
    pub json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegisteredFile {
    Rows(Vec<Asset>),
    Page(Page<Asset>),
}

impl RegisteredFile {
    fn into_assets(self) -> Vec<Asset> {
        match self {
            RegisteredFile::Rows(rows) => rows,
            RegisteredFile::Page(page) => page.into_rows(),
        }
    }
}

/// A scans file may be a bare entry array or a whole `inventory --json` report.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScansFile {
    Entries(Vec<ScannedEntry>),
    Report { scans: Vec<ScannedEntry> },
}

impl ScansFile {
    fn into_entries(self) -> Vec<ScannedEntry> {
        match self {
            ScansFile::Entries(entries) | ScansFile::Report { scans: entries } => entries,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReconcileOutput {
    location_id: LocationId,
    counts: DiscrepancyCounts,
    discrepancies: Vec<Discrepancy>,
}

pub fn run(args: ReconcileArgs) -> Result<()> {
    let registered = read_json::<RegisteredFile>(&args.registered)?.into_assets();

    let mut log = ScanLog::new();
    for entry in read_json::<ScansFile>(&args.scans)?.into_entries() {
        log.append(entry);
    }

    let discrepancies = reconcile(&registered, log.entries(), args.location_id);
    let counts = DiscrepancyCounts::tally(&discrepancies, log.len());

    if args.json {
        return print_json(&ReconcileOutput {
            location_id: args.location_id,
            counts,
            discrepancies,
        });
    }

    println!(
        "Location {}: {} registered, {} scanned",
        args.location_id,
        registered.len(),
        log.len()
    );
    print_discrepancies(&discrepancies, &counts);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let content = std::fs::read_to_string(path).map_err(|e| {
        HelpfulError::new(format!("Cannot read file: {}", path.display()))
            .with_context(e.to_string())
    })?;
    serde_json::from_str(&content)
        .map_err(|e| HelpfulError::json_parse_error(path, &e.to_string()).into())
}
