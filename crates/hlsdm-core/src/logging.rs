//! Logging setup: an append-only file under the XDG state dir, or stderr.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info,hlsdm=debug,hlsdm_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/hlsdm/hlsdm.log` (created directories included).
pub fn log_file_path() -> Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix("hlsdm")?.get_state_home();
    fs::create_dir_all(&dir).with_context(|| format!("create log dir {}", dir.display()))?;
    Ok(dir.join("hlsdm.log"))
}

/// Sends every event to the log file. Returns Err when the file cannot be
/// opened or a subscriber is already installed; the CLI then falls back to
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(path = %path.display(), "logging to file");
    Ok(())
}

/// Sends every event to stderr.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
