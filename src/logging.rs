//! Structured Logging Setup
//!
//! Installs the global `tracing` subscriber. Output goes to stderr so that
//! one-shot commands can print tool results on stdout.
//!
//! Precedence: `RUST_LOG` if set, otherwise `--verbose` (debug), otherwise
//! the configured level.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Parse a configured format name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => anyhow::bail!("Invalid log format: {}", other),
        }
    }
}

/// Resolve the default level from config and the verbose flag
pub fn default_level(config: &LoggingConfig, verbose: bool) -> Result<Level> {
    if verbose {
        return Ok(Level::DEBUG);
    }
    config
        .level
        .to_lowercase()
        .parse()
        .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
}

/// Initialize tracing for the process
///
/// # Errors
///
/// Fails on an unknown level or format, or if a global subscriber is already
/// installed.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = default_level(config, verbose)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match LogFormat::parse(&config.format)? {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}
