//! Logging setup for Stocktake binaries.
//!
//! Everything at the configured filter goes to a size-rotated file under
//! `~/.stocktake/logs`. The console (stderr) only shows warnings unless
//! `verbose` is set, so command output on stdout stays clean.

mod rolling;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use rolling::SharedRollingWriter;

const DEFAULT_LOG_FILTER: &str = "stocktake=info,stocktake_session=info,stocktake_backend=info";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer =
        SharedRollingWriter::new(log_dir, config.app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", config.app_name))?;

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Logging already initialized")?;

    Ok(())
}

/// Stocktake home: `$STOCKTAKE_HOME`, else `~/.stocktake`.
pub fn stocktake_home() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var("STOCKTAKE_HOME") {
        if !override_path.trim().is_empty() {
            return Ok(PathBuf::from(override_path));
        }
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".stocktake"))
}

/// `~/.stocktake/logs`
pub fn logs_dir() -> Result<PathBuf> {
    Ok(stocktake_home()?.join("logs"))
}

/// `~/.stocktake/config.toml`
pub fn config_path() -> Result<PathBuf> {
    Ok(stocktake_home()?.join("config.toml"))
}

pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}
