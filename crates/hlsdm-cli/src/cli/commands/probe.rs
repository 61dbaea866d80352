//! `hlsdm probe` – show what a manifest contains.

use anyhow::Result;
use hlsdm_core::config::HlsdmConfig;
use hlsdm_core::engine::{EngineSettings, Probe};
use hlsdm_core::job::format_duration;

use super::spawn_engine;

pub async fn run_probe(cfg: &HlsdmConfig, url: &str, json: bool) -> Result<()> {
    let dir = std::env::current_dir()?;
    let (engine, _events) = spawn_engine(cfg, EngineSettings::from_config(cfg), &dir)?;
    let probe = engine.probe(url).await;
    engine.shutdown().await;
    let probe = probe?;

    if json {
        println!("{}", serde_json::to_string_pretty(&probe)?);
        return Ok(());
    }
    match probe {
        Probe::Variants { variants } => {
            println!("{:<6} {:<12} {:<12} {}", "INDEX", "BANDWIDTH", "RESOLUTION", "NAME");
            for (i, v) in variants.iter().enumerate() {
                println!("{:<6} {:<12} {:<12} {}", i, v.bandwidth, v.resolution, v.name);
            }
        }
        Probe::Media {
            segment_count,
            duration_secs,
            encrypted,
        } => {
            println!("segments:  {}", segment_count);
            println!("duration:  {}", format_duration(duration_secs));
            println!("encrypted: {}", if encrypted { "yes" } else { "no" });
        }
    }
    Ok(())
}
