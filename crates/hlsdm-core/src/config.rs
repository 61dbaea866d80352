use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::job::OutputKind;
use crate::retry::RetryPolicy;

/// Automatic retry parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of automatic whole-job retries before the job is paused.
    pub budget: u32,
    /// Countdown length in ticks before a retry starts.
    pub countdown_ticks: u32,
    /// Length of one countdown tick in milliseconds.
    pub tick_millis: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            budget: 3,
            countdown_ticks: 3,
            tick_millis: 1000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            budget: self.budget,
            countdown_ticks: self.countdown_ticks,
            tick: Duration::from_millis(self.tick_millis.max(1)),
        }
    }
}

/// Global configuration loaded from `~/.config/hlsdm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HlsdmConfig {
    /// Maximum simultaneous segment fetches for the active job.
    pub max_concurrent_fetches: usize,
    /// Output kind for new jobs: "ts" keeps the transport stream, "mp4" transcodes.
    pub output_kind: OutputKind,
    /// Write segments incrementally instead of assembling once at the end.
    pub streaming: bool,
    /// Where finished files go (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Per-request timeout for manifest, key and segment fetches.
    pub request_timeout_secs: u64,
    /// Optional User-Agent header.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for HlsdmConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 6,
            output_kind: OutputKind::Ts,
            streaming: false,
            download_dir: None,
            request_timeout_secs: 30,
            user_agent: None,
            retry: None,
        }
    }
}

impl HlsdmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hlsdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HlsdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HlsdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: HlsdmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
