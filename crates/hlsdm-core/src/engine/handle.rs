//! Cloneable front door to a running engine.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::command::Command;
use super::open::{self, JobRequest, Opened, Probe};
use super::Shared;
use crate::error::HlsError;
use crate::job::{JobId, JobProgress, SegmentView};
use crate::manifest::{Manifest, VariantStream};
use crate::storage::OutputArtifact;
use crate::url_model::derive_title;

/// Async API over the engine loop. Every method fails with
/// `EngineStopped` once the loop has shut down.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
    shared: Arc<Shared>,
}

impl EngineHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, shared: Arc<Shared>) -> Self {
        EngineHandle { commands, shared }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, HlsError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| HlsError::EngineStopped)?;
        rx.await.map_err(|_| HlsError::EngineStopped)
    }

    /// Fetches and parses `req.url`. A media manifest becomes a queued job
    /// (activated at once when nothing else is downloading); a master
    /// manifest returns its variants for the caller to choose from.
    pub async fn open(&self, req: JobRequest) -> Result<Opened, HlsError> {
        let (url, manifest) = open::load_manifest(self.shared.fetcher.as_ref(), &req.url).await?;
        let title = req
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_title(&url));
        match manifest {
            Manifest::Master(variants) => Ok(Opened::Variants { title, variants }),
            Manifest::Media(playlist) => {
                let parts = open::build_parts(&self.shared, &req, url, title, playlist).await?;
                let id = self.request(|reply| Command::Add { parts, reply }).await??;
                Ok(Opened::Queued(id))
            }
        }
    }

    /// Opens `variant` of a master manifest titled `title`. The job is
    /// titled `"{title} ({variant name})"`; range and output choices come
    /// from `req`.
    pub async fn select_variant(
        &self,
        req: &JobRequest,
        title: &str,
        variant: &VariantStream,
    ) -> Result<Opened, HlsError> {
        let req = JobRequest {
            url: variant.url.clone(),
            title: Some(format!("{} ({})", title, variant.name)),
            ..req.clone()
        };
        self.open(req).await
    }

    /// Fetches and parses a manifest without creating a job.
    pub async fn probe(&self, url: &str) -> Result<Probe, HlsError> {
        let (_, manifest) = open::load_manifest(self.shared.fetcher.as_ref(), url).await?;
        Ok(Probe::from_manifest(manifest))
    }

    pub async fn pause(&self, id: JobId) -> Result<(), HlsError> {
        self.request(|reply| Command::Pause { id, reply }).await?
    }

    pub async fn resume(&self, id: JobId) -> Result<(), HlsError> {
        self.request(|reply| Command::Resume { id, reply }).await?
    }

    /// Pauses a downloading or ready job, resumes a paused one.
    pub async fn toggle(&self, id: JobId) -> Result<(), HlsError> {
        self.request(|reply| Command::Toggle { id, reply }).await?
    }

    /// Aborts the job's fetches, closes its stream writer and forgets it.
    pub async fn remove(&self, id: JobId) -> Result<(), HlsError> {
        self.request(|reply| Command::Remove { id, reply }).await?
    }

    /// Re-fetches one failed segment (zero-based manifest ordinal).
    pub async fn retry_segment(&self, id: JobId, index: usize) -> Result<(), HlsError> {
        self.request(|reply| Command::RetrySegment { id, index, reply })
            .await?
    }

    /// Resets every failed segment of the job and fetches them again.
    pub async fn retry_failed(&self, id: JobId) -> Result<(), HlsError> {
        self.request(|reply| Command::RetryFailed { id, reply }).await?
    }

    /// Delivers whatever a buffered job has so far, in order, gaps skipped.
    pub async fn force_download(&self, id: JobId) -> Result<OutputArtifact, HlsError> {
        self.request(|reply| Command::ForceDownload { id, reply })
            .await?
    }

    pub async fn start_many(&self, ids: &[JobId]) -> Result<(), HlsError> {
        let ids = ids.to_vec();
        self.request(|reply| Command::StartMany { ids, reply }).await
    }

    pub async fn pause_many(&self, ids: &[JobId]) -> Result<(), HlsError> {
        let ids = ids.to_vec();
        self.request(|reply| Command::PauseMany { ids, reply }).await
    }

    pub async fn remove_many(&self, ids: &[JobId]) -> Result<(), HlsError> {
        let ids = ids.to_vec();
        self.request(|reply| Command::RemoveMany { ids, reply }).await
    }

    /// Every job, oldest first.
    pub async fn jobs(&self) -> Result<Vec<JobProgress>, HlsError> {
        self.request(|reply| Command::Jobs { reply }).await
    }

    pub async fn segments(&self, id: JobId) -> Result<Vec<SegmentView>, HlsError> {
        self.request(|reply| Command::Segments { id, reply }).await?
    }

    /// Resolves once nothing is downloading, counting down, or in flight.
    pub async fn wait_idle(&self) -> Result<(), HlsError> {
        self.request(|reply| Command::WaitIdle { reply }).await
    }

    /// Stops the engine loop and aborts outstanding fetches.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}
