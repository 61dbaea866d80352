//! CLI for the HLSDM download manager.

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hlsdm_core::config;
use hlsdm_core::job::OutputKind;
use std::path::PathBuf;

use commands::{run_get, run_probe, GetOptions};

/// Top-level CLI for the HLSDM download manager.
#[derive(Debug, Parser)]
#[command(name = "hlsdm")]
#[command(about = "HLSDM: HLS segment download manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one or more HLS manifests. Jobs run one at a time, newest queued first.
    Get {
        /// Manifest URLs (master or media playlists).
        #[arg(required = true)]
        urls: Vec<String>,

        /// Job title; defaults to the URL's `title` parameter or a timestamp.
        #[arg(long)]
        title: Option<String>,

        /// Write segments to disk as they arrive instead of assembling at the end.
        #[arg(long)]
        stream: bool,

        /// Output kind: "ts" or "mp4" (mp4 needs a transcoder).
        #[arg(long, value_parser = parse_kind)]
        kind: Option<OutputKind>,

        /// First segment to download (1-based).
        #[arg(long, value_name = "N")]
        start: Option<usize>,

        /// Last segment to download (1-based, inclusive).
        #[arg(long, value_name = "N")]
        end: Option<usize>,

        /// Variant to pick from a master playlist (0 = highest bandwidth).
        #[arg(long, default_value = "0", value_name = "INDEX")]
        variant: usize,

        /// Directory for finished files (defaults to config, then current dir).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Read control commands from stdin until "quit".
        #[arg(long, short = 'i')]
        interactive: bool,
    },

    /// Show what a manifest contains without downloading.
    Probe {
        /// Manifest URL.
        url: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn parse_kind(s: &str) -> Result<OutputKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "ts" => Ok(OutputKind::Ts),
        "mp4" => Ok(OutputKind::Mp4),
        other => Err(format!("unknown output kind '{}', expected ts or mp4", other)),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                urls,
                title,
                stream,
                kind,
                start,
                end,
                variant,
                dir,
                interactive,
            } => {
                let download_dir = match dir.or_else(|| cfg.download_dir.clone()) {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let opts = GetOptions {
                    title,
                    stream,
                    kind,
                    start,
                    end,
                    variant,
                    download_dir,
                    interactive,
                };
                run_get(&cfg, &urls, opts).await?;
            }
            CliCommand::Probe { url, json } => run_probe(&cfg, &url, json).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
