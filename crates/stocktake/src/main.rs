//! Stocktake - asset inventory verification
//!
//! Compares the assets a Snipe-IT server has registered at a location with
//! the asset tags actually scanned there, and reports what is missing, what
//! turned up unexpectedly and what matched.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use stocktake_logging::{init_logging, LogConfig};
use stocktake_model::LocationId;

mod cli;

use cli::config::BackendArgs;

#[derive(Parser, Debug)]
#[command(name = "stocktake", version, about = "Asset inventory verification")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List inventory locations
    Locations {
        /// Only show locations whose name, address or city contains this text
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List assets registered at a location
    Assets {
        /// Location id
        location_id: LocationId,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an inventory session, reading scanned codes one per line
    Inventory {
        /// Location id
        location_id: LocationId,

        /// Read codes from this file instead of stdin
        #[arg(long)]
        codes: Option<PathBuf>,

        /// Print only the final report, as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile saved registered-asset and scan files offline
    Reconcile {
        /// JSON file with the registered assets
        #[arg(long)]
        registered: PathBuf,

        /// JSON file with scan entries (or an `inventory --json` report)
        #[arg(long)]
        scans: PathBuf,

        /// Location the inventory was taken at
        #[arg(long = "location")]
        location_id: LocationId,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move an asset's record to a location
    Relocate {
        /// Asset id
        asset_id: u64,

        /// Target location id
        location_id: LocationId,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Locations { json, .. }
            | Commands::Assets { json, .. }
            | Commands::Inventory { json, .. }
            | Commands::Reconcile { json, .. } => *json,
            Commands::Relocate { .. } => false,
        }
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let backend = &cli.backend;
    match cli.command {
        Commands::Locations { search, json } => {
            cli::locations::run(cli::locations::LocationsArgs { search, json }, backend).await
        }
        Commands::Assets { location_id, json } => {
            cli::assets::run(cli::assets::AssetsArgs { location_id, json }, backend).await
        }
        Commands::Inventory {
            location_id,
            codes,
            json,
        } => {
            cli::inventory::run(
                cli::inventory::InventoryArgs {
                    location_id,
                    codes,
                    json,
                },
                backend,
            )
            .await
        }
        Commands::Reconcile {
            registered,
            scans,
            location_id,
            json,
        } => cli::reconcile::run(cli::reconcile::ReconcileArgs {
            registered,
            scans,
            location_id,
            json,
        }),
        Commands::Relocate {
            asset_id,
            location_id,
        } => {
            cli::relocate::run(
                cli::relocate::RelocateArgs {
                    asset_id,
                    location_id,
                },
                backend,
            )
            .await
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run_command(cli))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.command.wants_json();

    if let Err(err) = init_logging(LogConfig {
        app_name: "stocktake",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
