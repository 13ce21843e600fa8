//! Configuration for the Stocktake CLI
//!
//! Priority:
//! 1. Command-line flags and `STOCKTAKE_*` environment variables
//! 2. `~/.stocktake/config.toml`, `[backend]` table
//! 3. Built-in defaults (no token, so sample data)

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stocktake_backend::{BackendConfig, FallbackBackend};

use crate::cli::error::HelpfulError;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StocktakeConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl StocktakeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| HelpfulError::config_parse_error(path, &e.to_string()).into())
    }
}

/// Backend selection flags shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct BackendArgs {
    /// Inventory server base URL
    #[arg(long, env = "STOCKTAKE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Inventory server API token
    #[arg(long, env = "STOCKTAKE_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Use built-in sample data instead of a server
    #[arg(
        long,
        env = "STOCKTAKE_USE_MOCK",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub mock: bool,

    /// Config file (default: ~/.stocktake/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl BackendArgs {
    /// Merge flags over the config file over defaults.
    pub fn resolve(&self) -> Result<BackendConfig> {
        let file = match &self.config {
            Some(path) if !path.exists() => {
                return Err(HelpfulError::file_not_found(path).into());
            }
            Some(path) => StocktakeConfig::load(path)?,
            None => {
                let path = stocktake_logging::config_path()?;
                if path.exists() {
                    StocktakeConfig::load(&path)?
                } else {
                    StocktakeConfig::default()
                }
            }
        };
        Ok(self.overlay(file.backend))
    }

    fn overlay(&self, mut config: BackendConfig) -> BackendConfig {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(token) = &self.api_token {
            config.api_token = token.clone();
        }
        config.use_mock |= self.mock;
        config
    }
}

/// Resolve configuration and build the backend selector.
pub fn connect(args: &BackendArgs) -> Result<(Arc<FallbackBackend>, BackendConfig)> {
    let config = args.resolve()?;
    let backend = FallbackBackend::from_config(&config)
        .map_err(|e| HelpfulError::from_backend(&e, &config.api_url))?;
    tracing::debug!(api_url = %config.api_url, mock = config.wants_mock(), "backend configured");
    Ok((Arc::new(backend), config))
}
