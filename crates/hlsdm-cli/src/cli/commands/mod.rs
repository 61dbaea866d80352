//! CLI command handlers.

mod get;
mod probe;

pub use get::{run_get, GetOptions};
pub use probe::run_probe;

use anyhow::Result;
use hlsdm_core::config::HlsdmConfig;
use hlsdm_core::engine::{EngineBuilder, EngineEvent, EngineHandle, EngineSettings};
use hlsdm_core::fetch::HttpFetcher;
use hlsdm_core::storage::DirectoryTarget;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Starts an engine that fetches over HTTP and writes into `dir`.
fn spawn_engine(
    cfg: &HlsdmConfig,
    settings: EngineSettings,
    dir: &Path,
) -> Result<(EngineHandle, UnboundedReceiver<EngineEvent>)> {
    let fetcher = HttpFetcher::from_config(cfg)?;
    Ok(EngineBuilder::new(settings, Arc::new(fetcher), Arc::new(DirectoryTarget::new(dir))).spawn())
}
