//! The download engine: one loop task owning every job.
//!
//! All job and scheduler mutation happens inside [`Engine::run`]. Segment
//! fetches run as spawned tasks and report back over a channel, tagged with
//! the claim ticket they were issued under; a result whose ticket no longer
//! holds its claim (paused, removed, aborted) is dropped before the
//! pipeline sees it. Retry countdowns are ticker tasks feeding the same
//! channel.

mod command;
mod event;
mod handle;
mod open;
mod pipeline;

pub use event::EngineEvent;
pub use handle::EngineHandle;
pub use open::{JobRequest, Opened, Probe};

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;

use self::command::Command;
use crate::config::HlsdmConfig;
use crate::crypto::{Aes128Factory, DecryptorFactory};
use crate::error::{FetchError, HlsError};
use crate::fetch::Fetch;
use crate::job::{FetchOrigin, JobId, JobParts, JobStatus, OutputKind, OutputMode, RestartKind, Ticket};
use crate::retry::{RetryDecision, RetryPolicy, TickOutcome};
use crate::scheduler::{Activation, TaskScheduler};
use crate::segmenter::SegmentStatus;
use crate::storage::{OutputArtifact, OutputSink, OutputTarget};
use crate::transcode::TranscoderFactory;
use crate::url_model::numbered_file_name;

const COMMAND_QUEUE: usize = 64;

/// Engine-wide knobs, read when jobs are created.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Simultaneous segment fetches for the downloading job.
    pub max_concurrent: usize,
    pub retry: RetryPolicy,
    /// Default output kind for new jobs.
    pub output_kind: OutputKind,
    /// Default output mode for new jobs.
    pub mode: OutputMode,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 6,
            retry: RetryPolicy::default(),
            output_kind: OutputKind::Ts,
            mode: OutputMode::Buffered,
        }
    }
}

impl EngineSettings {
    pub fn from_config(cfg: &HlsdmConfig) -> Self {
        Self {
            max_concurrent: cfg.max_concurrent_fetches.max(1),
            retry: cfg.retry_policy(),
            output_kind: cfg.output_kind,
            mode: OutputMode::from_streaming(cfg.streaming),
        }
    }
}

/// Capabilities shared by the engine loop and every handle.
pub(crate) struct Shared {
    pub(crate) settings: EngineSettings,
    pub(crate) fetcher: Arc<dyn Fetch>,
    pub(crate) target: Arc<dyn OutputTarget>,
    pub(crate) decryptors: Arc<dyn DecryptorFactory>,
    pub(crate) transcoders: Option<Arc<dyn TranscoderFactory>>,
}

/// Configures and starts an engine.
pub struct EngineBuilder {
    settings: EngineSettings,
    fetcher: Arc<dyn Fetch>,
    target: Arc<dyn OutputTarget>,
    decryptors: Arc<dyn DecryptorFactory>,
    transcoders: Option<Arc<dyn TranscoderFactory>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings, fetcher: Arc<dyn Fetch>, target: Arc<dyn OutputTarget>) -> Self {
        EngineBuilder {
            settings,
            fetcher,
            target,
            decryptors: Arc::new(Aes128Factory),
            transcoders: None,
        }
    }

    /// Replaces the default AES-128 decryptor factory.
    pub fn decryptors(mut self, factory: Arc<dyn DecryptorFactory>) -> Self {
        self.decryptors = factory;
        self
    }

    /// Enables `.mp4` output.
    pub fn transcoder(mut self, factory: Arc<dyn TranscoderFactory>) -> Self {
        self.transcoders = Some(factory);
        self
    }

    /// Spawns the engine loop on the current tokio runtime.
    pub fn spawn(self) -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
        let shared = Arc::new(Shared {
            settings: self.settings,
            fetcher: self.fetcher,
            target: self.target,
            decryptors: self.decryptors,
            transcoders: self.transcoders,
        });
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let engine = Engine {
            shared: Arc::clone(&shared),
            scheduler: TaskScheduler::new(),
            commands: cmd_rx,
            done_tx,
            done_rx,
            events: event_tx,
            fetches: HashMap::new(),
            countdowns: HashMap::new(),
            next_ticket: 0,
            idle_waiters: Vec::new(),
            was_idle: true,
        };
        tokio::spawn(engine.run());
        (EngineHandle::new(cmd_tx, shared), event_rx)
    }
}

/// Messages from fetch and ticker tasks back to the loop.
enum Completion {
    Fetched {
        job: JobId,
        index: usize,
        ticket: Ticket,
        result: Result<Bytes, FetchError>,
    },
    Tick {
        job: JobId,
        ticket: Ticket,
    },
}

struct Engine {
    shared: Arc<Shared>,
    scheduler: TaskScheduler,
    commands: mpsc::Receiver<Command>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
    events: mpsc::UnboundedSender<EngineEvent>,
    /// Running fetch tasks by ticket.
    fetches: HashMap<Ticket, AbortHandle>,
    /// Running countdown tickers by job.
    countdowns: HashMap<JobId, (Ticket, AbortHandle)>,
    next_ticket: Ticket,
    idle_waiters: Vec<oneshot::Sender<()>>,
    was_idle: bool,
}

impl Engine {
    async fn run(mut self) {
        tracing::debug!("engine started");
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(done) = self.done_rx.recv() => self.handle_completion(done),
            }
            self.check_idle();
        }
        self.stop_all();
        tracing::debug!("engine stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Add { parts, reply } => {
                let _ = reply.send(self.add(parts));
            }
            Command::Pause { id, reply } => {
                let _ = reply.send(self.pause(id));
            }
            Command::Resume { id, reply } => {
                let _ = reply.send(self.resume(id));
            }
            Command::Toggle { id, reply } => {
                let _ = reply.send(self.toggle(id));
            }
            Command::Remove { id, reply } => {
                let _ = reply.send(self.remove(id));
            }
            Command::RetrySegment { id, index, reply } => {
                let _ = reply.send(self.retry_segment(id, index));
            }
            Command::RetryFailed { id, reply } => {
                let _ = reply.send(self.retry_failed(id));
            }
            Command::ForceDownload { id, reply } => {
                let _ = reply.send(self.force_download(id));
            }
            Command::StartMany { ids, reply } => {
                for id in self.scheduler.oldest_first(&ids) {
                    let _ = self.resume(id);
                }
                let _ = reply.send(());
            }
            Command::PauseMany { ids, reply } => {
                for id in self.scheduler.oldest_first(&ids) {
                    let _ = self.pause(id);
                }
                let _ = reply.send(());
            }
            Command::RemoveMany { ids, reply } => {
                for id in self.scheduler.oldest_first(&ids) {
                    let _ = self.remove(id);
                }
                let _ = reply.send(());
            }
            Command::Jobs { reply } => {
                let _ = reply.send(self.scheduler.iter().map(|j| j.progress()).collect());
            }
            Command::Segments { id, reply } => {
                let views = self
                    .scheduler
                    .get(id)
                    .map(|j| j.segment_views())
                    .ok_or(HlsError::JobNotFound(id));
                let _ = reply.send(views);
            }
            Command::WaitIdle { reply } => {
                if self.is_idle() {
                    let _ = reply.send(());
                } else {
                    self.idle_waiters.push(reply);
                }
            }
            Command::Shutdown => {}
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Fetched {
                job,
                index,
                ticket,
                result,
            } => self.on_fetched(job, index, ticket, result),
            Completion::Tick { job, ticket } => self.on_tick(job, ticket),
        }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn emit_status(&self, id: JobId) {
        if let Some(job) = self.scheduler.get(id) {
            self.emit(EngineEvent::JobStatus {
                job: id,
                status: job.status(),
            });
        }
    }

    fn emit_progress(&self, id: JobId) {
        if let Some(job) = self.scheduler.get(id) {
            self.emit(EngineEvent::Progress(job.progress()));
        }
    }

    fn set_status(&mut self, id: JobId, status: JobStatus) {
        if let Some(job) = self.scheduler.get_mut(id) {
            if job.status() != status {
                job.set_status(status);
                self.emit_status(id);
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.scheduler.downloading().is_none() && self.countdowns.is_empty() && self.fetches.is_empty()
    }

    fn check_idle(&mut self) {
        let idle = self.is_idle();
        if idle {
            for w in self.idle_waiters.drain(..) {
                let _ = w.send(());
            }
            if !self.was_idle {
                tracing::debug!("engine idle");
                self.emit(EngineEvent::Idle);
            }
        }
        self.was_idle = idle;
    }

    fn next_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    // ---- scheduling ------------------------------------------------------

    /// Settles the job's file name, opens its sink and registers it.
    fn add(&mut self, mut parts: JobParts) -> Result<JobId, HlsError> {
        parts.file_name = self.unique_file_name(&parts.file_name);
        let sink = match parts.mode {
            OutputMode::Streaming => OutputSink::streaming(
                self.shared.target.open_stream(&parts.file_name)?,
                parts.range.target,
            ),
            OutputMode::Buffered => OutputSink::buffered(parts.range.target),
        };
        let title = parts.title.clone();
        let file_name = parts.file_name.clone();
        let id = self.scheduler.insert(parts, sink);
        tracing::info!(job = id, title = %title, "job added");
        self.emit(EngineEvent::JobAdded {
            job: id,
            title,
            file_name,
        });
        self.activate(id);
        Ok(id)
    }

    /// `file_name`, or `name (n).ext` for the first `n` that neither a live
    /// job nor the output target already uses.
    fn unique_file_name(&self, file_name: &str) -> String {
        let taken = |name: &str| {
            self.scheduler.iter().any(|j| j.file_name() == name) || self.shared.target.exists(name)
        };
        let mut candidate = file_name.to_string();
        let mut n = 1;
        while taken(&candidate) {
            candidate = numbered_file_name(file_name, n);
            n += 1;
        }
        if candidate != file_name {
            tracing::info!(requested = file_name, chosen = %candidate, "output name taken, renamed");
        }
        candidate
    }

    /// Activates `id` if nothing else is downloading, otherwise queues it.
    fn activate(&mut self, id: JobId) {
        self.cancel_countdown(id);
        match self.scheduler.activate(id) {
            Some(Activation::Started) => {
                tracing::info!(job = id, "job downloading");
                self.emit_status(id);
                if !self.flush_output(id) {
                    return;
                }
                if let Some(job) = self.scheduler.get_mut(id) {
                    job.restart(true);
                }
                self.reseed(id);
                self.emit_progress(id);
                let settled = self
                    .scheduler
                    .get(id)
                    .is_some_and(|j| j.is_finished() && j.in_flight() == 0);
                if settled {
                    self.finalize(id);
                }
            }
            Some(Activation::Queued) => {
                tracing::debug!(job = id, "job queued");
                self.emit_status(id);
            }
            Some(Activation::Ignored) | None => {}
        }
    }

    /// Activates the most recently added ready job, if nothing is downloading.
    fn advance(&mut self) {
        if let Some(next) = self.scheduler.pick_next() {
            self.activate(next);
        }
    }

    fn reseed(&mut self, id: JobId) {
        let cap = self.shared.settings.max_concurrent;
        let n = self.scheduler.get(id).map_or(0, |j| j.seed_count(cap));
        tracing::debug!(job = id, workers = n, "seeding pool");
        for _ in 0..n {
            if !self.spawn_next(id) {
                break;
            }
        }
    }

    /// Claims the next pending segment of `id` and starts its fetch.
    fn spawn_next(&mut self, id: JobId) -> bool {
        let ticket = self.next_ticket();
        let Some(job) = self.scheduler.get_mut(id) else {
            return false;
        };
        let Some((index, url)) = job.claim_next(ticket) else {
            return false;
        };
        self.spawn_fetch(id, index, ticket, url);
        true
    }

    fn spawn_fetch(&mut self, job: JobId, index: usize, ticket: Ticket, url: String) {
        self.emit(EngineEvent::Segment {
            job,
            index,
            status: SegmentStatus::InFlight,
        });
        let fetcher = Arc::clone(&self.shared.fetcher);
        let tx = self.done_tx.clone();
        let handle = tokio::spawn(async move {
            let result = fetcher.fetch(&url).await;
            let _ = tx.send(Completion::Fetched {
                job,
                index,
                ticket,
                result,
            });
        });
        self.fetches.insert(ticket, handle.abort_handle());
    }

    /// Aborts every outstanding fetch of `id`. Their results never reach
    /// the pipeline.
    fn abort_fetches(&mut self, id: JobId) {
        let Some(job) = self.scheduler.get_mut(id) else {
            return;
        };
        let tickets = job.abort_in_flight();
        if !tickets.is_empty() {
            tracing::debug!(job = id, count = tickets.len(), "aborting fetches");
        }
        for t in tickets {
            if let Some(h) = self.fetches.remove(&t) {
                h.abort();
            }
        }
    }

    // ---- segment completion ----------------------------------------------

    fn on_fetched(&mut self, id: JobId, index: usize, ticket: Ticket, result: Result<Bytes, FetchError>) {
        self.fetches.remove(&ticket);
        let Some(job) = self.scheduler.get_mut(id) else {
            return;
        };
        let Some(origin) = job.take_ticket(index, ticket) else {
            tracing::debug!(job = id, index, ticket, "stale completion dropped");
            return;
        };

        let outcome = match result {
            Ok(bytes) => pipeline::process_segment(job, index, bytes),
            Err(source) => Err(HlsError::SegmentFetchFailed { index, source }),
        };
        let status = match outcome {
            Ok(()) => {
                job.mark_success(index);
                SegmentStatus::Success
            }
            Err(HlsError::Output(e)) => {
                // The segment's bytes are parked in the sink; only the write is pending.
                job.mark_success(index);
                self.emit(EngineEvent::Segment {
                    job: id,
                    index,
                    status: SegmentStatus::Success,
                });
                self.fail_job(id, HlsError::Output(e));
                return;
            }
            Err(e) => {
                tracing::warn!(job = id, index, "{}", e);
                job.mark_error(index);
                SegmentStatus::Error
            }
        };
        self.emit(EngineEvent::Segment {
            job: id,
            index,
            status,
        });
        self.emit_progress(id);
        self.after_segment(id, origin);
    }

    fn after_segment(&mut self, id: JobId, origin: FetchOrigin) {
        let Some(job) = self.scheduler.get(id) else {
            return;
        };
        if job.is_finished() {
            if self.flush_output(id) {
                self.finalize(id);
                self.advance();
            }
            return;
        }
        if job.status() != JobStatus::Downloading {
            return;
        }
        if origin == FetchOrigin::Pool {
            self.spawn_next(id);
        }
        if self.scheduler.get(id).is_some_and(|j| j.is_stalled()) {
            match origin {
                FetchOrigin::Pool => self.on_stall(id),
                // A failed manual retry never spends budget.
                FetchOrigin::Single => {
                    tracing::info!(job = id, "job stalled after manual retry, pausing");
                    self.set_status(id, JobStatus::Pause);
                    self.advance();
                }
            }
        }
    }

    fn on_stall(&mut self, id: JobId) {
        let policy = self.shared.settings.retry;
        self.abort_fetches(id);
        self.cancel_countdown(id);
        self.set_status(id, JobStatus::Pause);
        let Some(job) = self.scheduler.get_mut(id) else {
            return;
        };
        let errors = job.error_count();
        match job.retry_mut().on_stall(&policy) {
            RetryDecision::Countdown(ticks) => {
                let remaining_budget = job.retry().remaining();
                tracing::info!(job = id, errors, ticks, remaining_budget, "retry scheduled");
                self.emit(EngineEvent::RetryScheduled {
                    job: id,
                    remaining_budget,
                    ticks,
                });
                self.start_countdown(id, policy);
            }
            RetryDecision::Exhausted => {
                tracing::warn!(job = id, errors, "{}", HlsError::RetryBudgetExhausted(id));
                self.emit(EngineEvent::RetryBudgetExhausted { job: id });
                self.advance();
            }
        }
    }

    fn start_countdown(&mut self, id: JobId, policy: RetryPolicy) {
        let ticket = self.next_ticket();
        let tx = self.done_tx.clone();
        let tick = policy.tick;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
            loop {
                interval.tick().await;
                if tx.send(Completion::Tick { job: id, ticket }).is_err() {
                    break;
                }
            }
        });
        self.countdowns.insert(id, (ticket, handle.abort_handle()));
    }

    fn stop_ticker(&mut self, id: JobId) {
        if let Some((_, h)) = self.countdowns.remove(&id) {
            h.abort();
        }
    }

    /// Stops a pending automatic retry (user took over).
    fn cancel_countdown(&mut self, id: JobId) {
        self.stop_ticker(id);
        if let Some(job) = self.scheduler.get_mut(id) {
            if job.retry_mut().cancel() {
                tracing::debug!(job = id, "retry countdown cancelled");
            }
        }
    }

    fn on_tick(&mut self, id: JobId, ticket: Ticket) {
        if self.countdowns.get(&id).map(|(t, _)| *t) != Some(ticket) {
            return;
        }
        let Some(job) = self.scheduler.get_mut(id) else {
            self.stop_ticker(id);
            return;
        };
        match job.retry_mut().tick() {
            TickOutcome::Waiting(remaining) => {
                self.emit(EngineEvent::CountdownTick { job: id, remaining });
            }
            TickOutcome::Restart => {
                self.stop_ticker(id);
                self.emit(EngineEvent::CountdownTick {
                    job: id,
                    remaining: 0,
                });
                tracing::info!(job = id, "retrying failed segments");
                self.activate(id);
            }
            TickOutcome::Idle => self.stop_ticker(id),
        }
    }

    /// Writes output held back by an earlier write failure. On a new
    /// failure the job is stopped and `false` is returned.
    fn flush_output(&mut self, id: JobId) -> bool {
        let Some(job) = self.scheduler.get_mut(id) else {
            return false;
        };
        match job.sink.flush() {
            Ok(()) => true,
            Err(e) => {
                self.fail_job(id, HlsError::Output(e));
                false
            }
        }
    }

    /// Delivers or closes the output of a finished job and marks it done.
    fn finalize(&mut self, id: JobId) {
        self.cancel_countdown(id);
        let target = Arc::clone(&self.shared.target);
        let Some(job) = self.scheduler.get_mut(id) else {
            return;
        };
        if !job.sink.is_complete() {
            tracing::warn!(job = id, written = job.sink.written(), "output incomplete, not finalizing");
            return;
        }
        let result = match job.mode() {
            OutputMode::Streaming => job.sink.close(),
            OutputMode::Buffered => match job.sink.assemble() {
                Some(bytes) => target.deliver(&OutputArtifact {
                    file_name: job.file_name().to_string(),
                    media_type: job.kind().media_type(),
                    bytes,
                }),
                None => Ok(()),
            },
        };
        let file_name = job.file_name().to_string();
        match result {
            Ok(()) => {
                tracing::info!(job = id, file = %file_name, "job done");
                self.set_status(id, JobStatus::Done);
                self.emit(EngineEvent::JobFinished { job: id, file_name });
            }
            Err(e) => self.fail_job(id, HlsError::Output(e)),
        }
    }

    /// Stops a job whose output can no longer be written.
    fn fail_job(&mut self, id: JobId, err: HlsError) {
        tracing::error!(job = id, "output failed: {}", err);
        self.abort_fetches(id);
        self.cancel_countdown(id);
        let was_downloading = self
            .scheduler
            .get(id)
            .is_some_and(|j| j.status() == JobStatus::Downloading);
        self.set_status(id, JobStatus::Pause);
        self.emit(EngineEvent::JobFailed {
            job: id,
            error: err.to_string(),
        });
        if was_downloading {
            self.advance();
        }
    }

    // ---- user operations -------------------------------------------------

    fn pause(&mut self, id: JobId) -> Result<(), HlsError> {
        let status = self
            .scheduler
            .get(id)
            .map(|j| j.status())
            .ok_or(HlsError::JobNotFound(id))?;
        if status == JobStatus::Done {
            return Ok(());
        }
        self.abort_fetches(id);
        self.cancel_countdown(id);
        self.set_status(id, JobStatus::Pause);
        self.emit_progress(id);
        if status == JobStatus::Downloading {
            tracing::info!(job = id, "job paused");
            self.advance();
        }
        Ok(())
    }

    fn resume(&mut self, id: JobId) -> Result<(), HlsError> {
        let status = self
            .scheduler
            .get(id)
            .map(|j| j.status())
            .ok_or(HlsError::JobNotFound(id))?;
        if matches!(status, JobStatus::Done | JobStatus::Downloading) {
            return Ok(());
        }
        self.activate(id);
        Ok(())
    }

    fn toggle(&mut self, id: JobId) -> Result<(), HlsError> {
        let status = self
            .scheduler
            .get(id)
            .map(|j| j.status())
            .ok_or(HlsError::JobNotFound(id))?;
        match status {
            JobStatus::Downloading | JobStatus::Ready => self.pause(id),
            JobStatus::Pause => self.resume(id),
            JobStatus::Done => Ok(()),
        }
    }

    fn remove(&mut self, id: JobId) -> Result<(), HlsError> {
        if self.scheduler.get(id).is_none() {
            return Err(HlsError::JobNotFound(id));
        }
        self.abort_fetches(id);
        self.cancel_countdown(id);
        if let Some(mut job) = self.scheduler.remove(id) {
            if let Err(e) = job.sink.close() {
                tracing::warn!(job = id, "closing output on removal: {}", e);
            }
            tracing::info!(job = id, "job removed");
        }
        self.emit(EngineEvent::JobRemoved { job: id });
        self.advance();
        Ok(())
    }

    fn retry_segment(&mut self, id: JobId, index: usize) -> Result<(), HlsError> {
        if self.scheduler.get(id).is_none() {
            return Err(HlsError::JobNotFound(id));
        }
        if let Some(other) = self.scheduler.downloading().filter(|d| *d != id) {
            return Err(HlsError::OtherJobDownloading(other));
        }
        let ticket = self.next_ticket();
        let job = self.scheduler.get_mut(id).ok_or(HlsError::JobNotFound(id))?;
        let url = job.begin_single(index, ticket)?;
        self.scheduler.set_current(id);
        tracing::info!(job = id, index, "manual segment retry");
        self.spawn_fetch(id, index, ticket, url);
        Ok(())
    }

    fn retry_failed(&mut self, id: JobId) -> Result<(), HlsError> {
        let job = self.scheduler.get_mut(id).ok_or(HlsError::JobNotFound(id))?;
        match job.status() {
            JobStatus::Done => {}
            JobStatus::Downloading => {
                let kind = job.restart(false);
                tracing::info!(job = id, ?kind, "retrying failed segments");
                if kind == RestartKind::Reseed {
                    self.reseed(id);
                }
                self.emit_progress(id);
            }
            JobStatus::Ready | JobStatus::Pause => self.activate(id),
        }
        Ok(())
    }

    fn force_download(&mut self, id: JobId) -> Result<OutputArtifact, HlsError> {
        let job = self.scheduler.get(id).ok_or(HlsError::JobNotFound(id))?;
        let bytes = job
            .sink
            .assemble()
            .filter(|b| !b.is_empty())
            .ok_or(HlsError::NothingDownloaded(id))?;
        let artifact = OutputArtifact {
            file_name: job.file_name().to_string(),
            media_type: job.kind().media_type(),
            bytes,
        };
        self.shared.target.deliver(&artifact)?;
        tracing::info!(job = id, bytes = artifact.bytes.len(), "partial output delivered");
        Ok(artifact)
    }

    fn stop_all(&mut self) {
        for (_, h) in self.fetches.drain() {
            h.abort();
        }
        for (_, (_, h)) in self.countdowns.drain() {
            h.abort();
        }
    }
}
