//! Download jobs: identity, lifecycle status, output choice and progress.

mod progress;
mod state;

pub use progress::{format_duration, JobProgress, SegmentView};
pub use state::{FetchOrigin, Job, JobParts, RestartKind};

use serde::{Deserialize, Serialize};

/// Registry-unique job identifier, assigned in creation order.
pub type JobId = u64;

/// Claim ticket tying a spawned fetch to the record it was issued for.
pub type Ticket = u64;

/// Lifecycle status of a job. At most one job is `Downloading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Queued behind the downloading job.
    Ready,
    Downloading,
    /// Stopped by the user, by an exhausted retry budget, or waiting for a
    /// retry countdown.
    Pause,
    Done,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Ready => "ready",
            JobStatus::Downloading => "downloading",
            JobStatus::Pause => "pause",
            JobStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// The transport stream as fetched (after decryption).
    Ts,
    /// Transcoded into a fragmented MP4 container.
    Mp4,
}

impl OutputKind {
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Ts => "ts",
            OutputKind::Mp4 => "mp4",
        }
    }

    /// Media type tagged on buffered artifacts.
    pub fn media_type(self) -> &'static str {
        match self {
            OutputKind::Ts => "video/MP2T",
            OutputKind::Mp4 => "video/mp4",
        }
    }

    pub fn needs_transcode(self) -> bool {
        self == OutputKind::Mp4
    }
}

/// How output bytes reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write contiguous segments as they complete.
    Streaming,
    /// Hold everything, assemble once at the end.
    Buffered,
}

impl OutputMode {
    pub fn from_streaming(streaming: bool) -> Self {
        if streaming {
            OutputMode::Streaming
        } else {
            OutputMode::Buffered
        }
    }
}
