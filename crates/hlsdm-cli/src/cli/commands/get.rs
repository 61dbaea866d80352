//! `hlsdm get` – download manifests into a directory.

use anyhow::{bail, Result};
use hlsdm_core::config::HlsdmConfig;
use hlsdm_core::engine::{EngineEvent, EngineHandle, EngineSettings, JobRequest, Opened};
use hlsdm_core::job::{JobStatus, OutputKind, OutputMode};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;

use super::spawn_engine;
use crate::cli::console;

/// Per-invocation choices for `hlsdm get`.
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub title: Option<String>,
    pub stream: bool,
    pub kind: Option<OutputKind>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub variant: usize,
    pub download_dir: PathBuf,
    pub interactive: bool,
}

impl GetOptions {
    fn request(&self, url: &str) -> JobRequest {
        JobRequest {
            url: url.to_string(),
            title: self.title.clone(),
            kind: self.kind,
            mode: self.stream.then_some(OutputMode::Streaming),
            start: self.start,
            end: self.end,
        }
    }
}

pub async fn run_get(cfg: &HlsdmConfig, urls: &[String], opts: GetOptions) -> Result<()> {
    let settings = EngineSettings::from_config(cfg);
    let (engine, events) = spawn_engine(cfg, settings, &opts.download_dir)?;
    let printer = tokio::spawn(print_events(events));

    let mut open_failures = 0usize;
    for url in urls {
        if let Err(e) = open_one(&engine, &opts, url).await {
            eprintln!("{}: {:#}", url, e);
            open_failures += 1;
        }
    }

    if opts.interactive {
        console::run(&engine).await?;
    } else {
        engine.wait_idle().await?;
    }

    let jobs = engine.jobs().await?;
    let unfinished: Vec<_> = jobs.iter().filter(|j| j.status != JobStatus::Done).collect();
    for j in &unfinished {
        println!(
            "[{}] {} left {} at {} ({} of {} segments failed)",
            j.id,
            j.title,
            j.status,
            j.percent_label(),
            j.errors,
            j.target
        );
    }

    engine.shutdown().await;
    let _ = printer.await;

    if open_failures > 0 || !unfinished.is_empty() {
        bail!(
            "{} manifest(s) could not be opened, {} job(s) did not finish",
            open_failures,
            unfinished.len()
        );
    }
    Ok(())
}

/// Opens `url`, picking `opts.variant` when it is a master playlist.
/// Nested master playlists are followed the same way.
async fn open_one(engine: &EngineHandle, opts: &GetOptions, url: &str) -> Result<()> {
    let req = opts.request(url);
    let mut opened = engine.open(req.clone()).await?;
    loop {
        match opened {
            Opened::Queued(id) => {
                tracing::info!(job = id, url, "job queued");
                return Ok(());
            }
            Opened::Variants { title, variants } => {
                let Some(variant) = variants.get(opts.variant) else {
                    bail!(
                        "variant {} requested but the playlist has {}",
                        opts.variant,
                        variants.len()
                    );
                };
                println!(
                    "{}: picked variant {} ({}, {} bps)",
                    title, variant.name, variant.resolution, variant.bandwidth
                );
                opened = engine.select_variant(&req, &title, variant).await?;
            }
        }
    }
}

async fn print_events(mut events: UnboundedReceiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::JobAdded {
                job,
                title,
                file_name,
            } => println!("[{}] added {} -> {}", job, title, file_name),
            EngineEvent::Progress(p) => println!(
                "[{}] {} {}/{} segments, {} failed",
                p.id,
                p.percent_label(),
                p.success,
                p.target,
                p.errors
            ),
            EngineEvent::RetryScheduled {
                job,
                remaining_budget,
                ticks,
            } => println!(
                "[{}] stalled, retrying after {} ticks ({} retries left)",
                job, ticks, remaining_budget
            ),
            EngineEvent::CountdownTick { job, remaining } => {
                println!("[{}] retry in {}", job, remaining)
            }
            EngineEvent::RetryBudgetExhausted { job } => println!(
                "[{}] paused: retry budget exhausted (try `retry-failed {}`)",
                job, job
            ),
            EngineEvent::JobFinished { job, file_name } => println!("[{}] saved {}", job, file_name),
            EngineEvent::JobFailed { job, error } => eprintln!("[{}] failed: {}", job, error),
            EngineEvent::JobRemoved { job } => println!("[{}] removed", job),
            EngineEvent::JobStatus { job, status } => tracing::debug!(job, %status, "status"),
            EngineEvent::Segment { job, index, status } => {
                tracing::trace!(job, index, status = status.as_str(), "segment")
            }
            EngineEvent::Idle => tracing::debug!("engine idle"),
        }
    }
}
