//! Per-job download state: records, cursor, counters and claims.
//!
//! Everything here is synchronous. The engine owns every `Job` and is the
//! only caller, so a record is never written by two workers at once: a
//! worker claims an index (with a ticket) before its fetch is issued and
//! only the holder of that ticket may complete it.

use std::collections::BTreeMap;

use bytes::Bytes;

use super::progress::{JobProgress, SegmentView};
use super::{JobId, JobStatus, OutputKind, OutputMode, Ticket};
use crate::crypto::JobCrypto;
use crate::error::HlsError;
use crate::manifest::MediaSegment;
use crate::retry::RetryController;
use crate::segmenter::{SegmentRange, SegmentRecord, SegmentStatus};
use crate::storage::OutputSink;
use crate::transcode::Transcoder;

/// Everything needed to build a [`Job`] except its output sink, which the
/// engine opens once the file name is settled.
pub struct JobParts {
    pub url: String,
    pub title: String,
    pub file_name: String,
    pub kind: OutputKind,
    pub mode: OutputMode,
    pub segments: Vec<MediaSegment>,
    pub range: SegmentRange,
    /// Seconds covered by `range`.
    pub duration: f64,
    pub crypto: Option<JobCrypto>,
    pub transcoder: Option<Box<dyn Transcoder>>,
    pub retry: RetryController,
}

/// Who issued a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// A worker of the bounded pool; it claims a replacement when done.
    Pool,
    /// A manual single-segment retry.
    Single,
}

/// What a restart did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartKind {
    /// Cursor moved to the first unfinished index; the pool must be reseeded.
    Reseed,
    /// Cursor moved back while workers are still running; they pick the
    /// rewound indices up on their own.
    Rewind,
}

pub struct Job {
    id: JobId,
    url: String,
    title: String,
    file_name: String,
    kind: OutputKind,
    mode: OutputMode,
    status: JobStatus,
    segments: Vec<MediaSegment>,
    /// One record per slot of `range`.
    records: Vec<SegmentRecord>,
    range: SegmentRange,
    /// Next zero-based ordinal a worker will look at.
    cursor: usize,
    success: usize,
    errors: usize,
    retry: RetryController,
    pool: BTreeMap<usize, Ticket>,
    single: BTreeMap<usize, Ticket>,
    duration: f64,
    pub(crate) crypto: Option<JobCrypto>,
    pub(crate) transcoder: Option<Box<dyn Transcoder>>,
    /// Init header emitted by the transcoder, waiting for the first slot.
    pub(crate) init_header: Option<Bytes>,
    pub(crate) sink: OutputSink,
}

impl Job {
    pub fn new(id: JobId, parts: JobParts, sink: OutputSink) -> Self {
        let range = parts.range;
        let records = parts.segments[range.first_index()..range.end_index()]
            .iter()
            .map(|s| SegmentRecord::new(s.label.clone()))
            .collect();
        Job {
            id,
            url: parts.url,
            title: parts.title,
            file_name: parts.file_name,
            kind: parts.kind,
            mode: parts.mode,
            status: JobStatus::Ready,
            segments: parts.segments,
            records,
            range,
            cursor: range.first_index(),
            success: 0,
            errors: 0,
            retry: parts.retry,
            pool: BTreeMap::new(),
            single: BTreeMap::new(),
            duration: parts.duration,
            crypto: parts.crypto,
            transcoder: parts.transcoder,
            init_header: None,
            sink,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: JobStatus) {
        if self.status != status {
            tracing::debug!(job = self.id, from = %self.status, to = %status, "job status");
            self.status = status;
        }
    }

    pub fn range(&self) -> SegmentRange {
        self.range
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn success_count(&self) -> usize {
        self.success
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn retry(&self) -> &RetryController {
        &self.retry
    }

    pub(crate) fn retry_mut(&mut self) -> &mut RetryController {
        &mut self.retry
    }

    /// Fetches issued by the pool and not yet completed.
    pub fn pool_in_flight(&self) -> usize {
        self.pool.len()
    }

    /// All outstanding fetches, pool and manual.
    pub fn in_flight(&self) -> usize {
        self.pool.len() + self.single.len()
    }

    /// Record for zero-based manifest ordinal `index`, if inside the range.
    pub fn record(&self, index: usize) -> Option<&SegmentRecord> {
        if self.range.contains_index(index) {
            self.records.get(self.range.slot(index))
        } else {
            None
        }
    }

    fn set_record(&mut self, index: usize, status: SegmentStatus) {
        let slot = self.range.slot(index);
        if let Some(r) = self.records.get_mut(slot) {
            r.status = status;
        }
    }

    /// Every segment of the range succeeded.
    pub fn is_finished(&self) -> bool {
        self.success == self.range.target
    }

    /// Every segment of the range is terminal and at least one failed.
    pub fn is_stalled(&self) -> bool {
        self.errors > 0 && self.success + self.errors == self.range.target
    }

    /// Workers to start when fetching (re)starts: never more than the cap,
    /// never more than the work left, minus workers already running.
    pub fn seed_count(&self, cap: usize) -> usize {
        cap.min(self.range.target - self.success)
            .saturating_sub(self.pool.len())
    }

    /// Advances the cursor to the next pending record and marks it in flight.
    /// Returns its ordinal and URL, or `None` once the cursor reaches the end.
    pub fn claim_next(&mut self, ticket: Ticket) -> Option<(usize, String)> {
        while self.cursor < self.range.end_index() {
            let index = self.cursor;
            self.cursor += 1;
            if self.record(index).map(|r| r.status) == Some(SegmentStatus::Pending) {
                self.set_record(index, SegmentStatus::InFlight);
                self.pool.insert(index, ticket);
                return Some((index, self.segments[index].url.clone()));
            }
        }
        None
    }

    /// Starts a manual retry of a failed segment.
    pub fn begin_single(&mut self, index: usize, ticket: Ticket) -> Result<String, HlsError> {
        if self.record(index).map(|r| r.status) != Some(SegmentStatus::Error) {
            return Err(HlsError::SegmentNotFailed {
                job: self.id,
                index,
            });
        }
        self.set_record(index, SegmentStatus::InFlight);
        self.errors -= 1;
        self.single.insert(index, ticket);
        Ok(self.segments[index].url.clone())
    }

    /// Releases the claim on `index` if `ticket` still holds it. Stale or
    /// aborted tickets return `None` and must not reach the pipeline.
    pub fn take_ticket(&mut self, index: usize, ticket: Ticket) -> Option<FetchOrigin> {
        if self.pool.get(&index) == Some(&ticket) {
            self.pool.remove(&index);
            Some(FetchOrigin::Pool)
        } else if self.single.get(&index) == Some(&ticket) {
            self.single.remove(&index);
            Some(FetchOrigin::Single)
        } else {
            None
        }
    }

    pub fn mark_success(&mut self, index: usize) {
        self.set_record(index, SegmentStatus::Success);
        self.success += 1;
    }

    pub fn mark_error(&mut self, index: usize) {
        self.set_record(index, SegmentStatus::Error);
        self.errors += 1;
    }

    /// Drops every outstanding claim and returns the tickets to abort.
    /// Pool records go back to pending; manual retries go back to error.
    pub fn abort_in_flight(&mut self) -> Vec<Ticket> {
        let mut tickets = Vec::with_capacity(self.in_flight());
        for (index, ticket) in std::mem::take(&mut self.pool) {
            self.set_record(index, SegmentStatus::Pending);
            tickets.push(ticket);
        }
        for (index, ticket) in std::mem::take(&mut self.single) {
            self.set_record(index, SegmentStatus::Error);
            self.errors += 1;
            tickets.push(ticket);
        }
        tickets
    }

    /// Resets failed records to pending, clears the failure count and moves
    /// the cursor to the first pending index.
    ///
    /// With `force`, or when the cursor had already reached the end, the
    /// pool must be reseeded. Otherwise only the cursor is rewound and the
    /// running workers continue from there.
    pub fn restart(&mut self, force: bool) -> RestartKind {
        let reached_end = self.cursor >= self.range.end_index();
        for r in &mut self.records {
            if r.status == SegmentStatus::Error {
                r.status = SegmentStatus::Pending;
            }
        }
        self.errors = 0;

        let first_pending = self
            .records
            .iter()
            .position(|r| r.status == SegmentStatus::Pending)
            .map(|slot| slot + self.range.first_index());
        self.cursor = match first_pending {
            Some(index) => index.min(self.cursor),
            None => self.cursor,
        };

        if force || reached_end {
            RestartKind::Reseed
        } else {
            RestartKind::Rewind
        }
    }

    pub fn progress(&self) -> JobProgress {
        JobProgress {
            id: self.id,
            title: self.title.clone(),
            file_name: self.file_name.clone(),
            status: self.status,
            kind: self.kind,
            mode: self.mode,
            success: self.success,
            errors: self.errors,
            target: self.range.target,
            range: self.range,
            duration_secs: self.duration,
            retries_left: self.retry.remaining(),
            countdown: self.retry.countdown(),
        }
    }

    pub fn segment_views(&self) -> Vec<SegmentView> {
        self.records
            .iter()
            .enumerate()
            .map(|(slot, r)| SegmentView {
                index: slot + self.range.first_index(),
                label: r.label.clone(),
                status: r.status,
            })
            .collect()
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("status", &self.status)
            .field("range", &self.range)
            .field("cursor", &self.cursor)
            .field("success", &self.success)
            .field("errors", &self.errors)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
