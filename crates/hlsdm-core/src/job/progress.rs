//! Progress snapshots for the UI layer.

use serde::Serialize;

use super::{JobId, JobStatus, OutputKind, OutputMode};
use crate::segmenter::{SegmentRange, SegmentStatus};

/// Snapshot of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProgress {
    pub id: JobId,
    pub title: String,
    pub file_name: String,
    pub status: JobStatus,
    pub kind: OutputKind,
    pub mode: OutputMode,
    /// Segments fetched and written into the sink.
    pub success: usize,
    pub errors: usize,
    pub target: usize,
    pub range: SegmentRange,
    pub duration_secs: f64,
    pub retries_left: u32,
    /// Ticks left before an automatic retry, when one is pending.
    pub countdown: Option<u32>,
}

impl JobProgress {
    /// `success / target` as a percentage rounded to two decimals.
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 0.0;
        }
        let p = self.success as f64 * 100.0 / self.target as f64;
        (p * 100.0).round() / 100.0
    }

    /// `percent()` formatted for display, e.g. `"42.86%"`.
    pub fn percent_label(&self) -> String {
        format!("{:.2}%", self.percent())
    }
}

/// One segment as shown in the per-segment status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentView {
    /// Zero-based manifest ordinal.
    pub index: usize,
    pub label: String,
    pub status: SegmentStatus,
}

/// Formats seconds as `hh:mm:ss` (hours are not wrapped).
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
