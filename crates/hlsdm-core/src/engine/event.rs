//! Notifications pushed from the engine to the UI layer.

use crate::job::{JobId, JobProgress, JobStatus};
use crate::segmenter::SegmentStatus;

/// Everything the UI needs to mirror engine state without polling.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    JobAdded {
        job: JobId,
        title: String,
        file_name: String,
    },
    JobStatus {
        job: JobId,
        status: JobStatus,
    },
    Segment {
        job: JobId,
        /// Zero-based manifest ordinal.
        index: usize,
        status: SegmentStatus,
    },
    Progress(JobProgress),
    /// A stalled job was paused and will restart after `ticks` ticks.
    RetryScheduled {
        job: JobId,
        remaining_budget: u32,
        ticks: u32,
    },
    CountdownTick {
        job: JobId,
        remaining: u32,
    },
    /// A stalled job has no automatic retries left and stays paused.
    RetryBudgetExhausted {
        job: JobId,
    },
    /// Output was delivered (buffered) or the stream was closed (streaming).
    JobFinished {
        job: JobId,
        file_name: String,
    },
    /// Writing or delivering output failed; the job is paused.
    JobFailed {
        job: JobId,
        error: String,
    },
    JobRemoved {
        job: JobId,
    },
    /// Nothing is downloading, counting down, or in flight.
    Idle,
}
