//! Inventory command - run a scanning session at one location
//!
//! Codes are read one per line from a file or stdin. Lines starting with
//! `:` drive the session instead of being scanned:
//!
//! ```text
//! :relocate <asset-id>   move a scanned asset's record here
//! :reset                 drop all scans (session back to ready)
//! :start                 start scanning again after a reset
//! :refresh               re-fetch the registered assets
//! :report                print the current discrepancies
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use stocktake_backend::InventoryBackend;
use stocktake_model::LocationId;
use stocktake_session::{CaptureGuard, CaptureSource, IngestOutcome, InventorySession, LineCapture};
use tokio::io::BufReader;
use tracing::warn;

use crate::cli::config::{connect, BackendArgs};
use crate::cli::error::HelpfulError;
use crate::cli::output::{print_discrepancies, print_json};

#[derive(Debug)]
pub struct InventoryArgs {
    pub location_id: LocationId,
    pub codes: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Directive<'a> {
    Scan(&'a str),
    Relocate(u64),
    Reset,
    Start,
    Refresh,
    Report,
    Unknown(&'a str),
}

fn parse_directive(line: &str) -> Directive<'_> {
    let Some(command) = line.strip_prefix(':') else {
        return Directive::Scan(line);
    };
    let mut words = command.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("relocate"), Some(id), None) => id
            .parse()
            .map(Directive::Relocate)
            .unwrap_or(Directive::Unknown(line)),
        (Some("reset"), None, None) => Directive::Reset,
        (Some("start"), None, None) => Directive::Start,
        (Some("refresh"), None, None) => Directive::Refresh,
        (Some("report"), None, None) => Directive::Report,
        _ => Directive::Unknown(line),
    }
}

pub async fn run(args: InventoryArgs, backend_args: &BackendArgs) -> Result<()> {
    let (backend, config) = connect(backend_args)?;
    let location = backend
        .get_location(args.location_id)
        .await
        .map_err(|e| HelpfulError::from_backend(&e, &config.api_url))?;

    let mut session = InventorySession::new(backend, location);
    if let Err(err) = session.load().await {
        warn!(error = %err, "starting inventory without registered assets");
        eprintln!("Warning: {}", err);
    }
    session.start()?;

    match &args.codes {
        Some(path) => {
            if !path.exists() {
                return Err(HelpfulError::file_not_found(path).into());
            }
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open codes file: {}", path.display()))?;
            let mut source = LineCapture::new(BufReader::new(file));
            drive(&mut session, &mut source, args.json).await?;
        }
        None => {
            let mut source = LineCapture::new(BufReader::new(tokio::io::stdin()));
            drive(&mut session, &mut source, args.json).await?;
        }
    }

    if args.json {
        print_json(&session.report())
    } else {
        print_summary(&session);
        Ok(())
    }
}

/// Feed lines from `source` into the session until it is exhausted.
/// Per-line failures are reported and skipped.
async fn drive<S: CaptureSource + ?Sized>(
    session: &mut InventorySession,
    source: &mut S,
    quiet: bool,
) -> Result<()> {
    let mut capture = CaptureGuard::arm(source)
        .await
        .map_err(|e| HelpfulError::capture_unavailable(&e))?;

    while let Some(line) = capture.next_code().await {
        match parse_directive(&line) {
            Directive::Scan(code) => match session.ingest(code).await {
                Ok(outcome) if !quiet => print_outcome(code, &outcome),
                Ok(_) => {}
                Err(err) => eprintln!("Skipped {}: {}", code, err),
            },
            Directive::Relocate(asset_id) => match session.relocate(asset_id).await {
                Ok(()) if !quiet => println!(
                    "Relocated asset {} to {}",
                    asset_id,
                    session.location().name
                ),
                Ok(()) => {}
                Err(err) => eprintln!("Warning: {}", err),
            },
            Directive::Reset => {
                if let Err(err) = session.reset() {
                    eprintln!("Warning: {}", err);
                }
            }
            Directive::Start => {
                if let Err(err) = session.start() {
                    eprintln!("Warning: {}", err);
                }
            }
            Directive::Refresh => match session.refresh().await {
                Ok(count) if !quiet => println!("Refreshed: {} registered asset(s)", count),
                Ok(_) => {}
                Err(err) => eprintln!("Warning: {}", err),
            },
            Directive::Report => {
                if !quiet {
                    print_summary(session);
                }
            }
            Directive::Unknown(text) => eprintln!("Warning: unknown command '{}'", text),
        }
    }
    Ok(())
}

fn print_outcome(code: &str, outcome: &IngestOutcome) {
    match outcome {
        IngestOutcome::Appended(entry) => match &entry.asset {
            Some(asset) => {
                let location = asset
                    .location
                    .as_ref()
                    .map(|l| l.name.as_str())
                    .unwrap_or("no location");
                println!("+ {}  {} ({})", code, asset.name, location);
            }
            None => println!("? {}  not found", code),
        },
        IngestOutcome::Duplicate => println!("= {}  already scanned", code),
        IngestOutcome::Ignored => {}
    }
}

fn print_summary(session: &InventorySession) {
    let location = session.location();
    println!(
        "{} (location {}) [{}] via {}",
        location.name,
        location.id,
        session.state(),
        session.backend_name()
    );
    print_discrepancies(session.discrepancies(), &session.counts());
}
