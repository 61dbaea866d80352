//! Per-segment state as seen by the worker pool and the UI.

use serde::Serialize;

/// Fetch state of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentStatus {
    Pending,
    InFlight,
    Success,
    Error,
}

impl SegmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentStatus::Pending => "pending",
            SegmentStatus::InFlight => "in-flight",
            SegmentStatus::Success => "success",
            SegmentStatus::Error => "error",
        }
    }

    /// Success and error are terminal until a retry resets errors.
    pub fn is_terminal(self) -> bool {
        matches!(self, SegmentStatus::Success | SegmentStatus::Error)
    }
}

/// One segment: its manifest line (display label) and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRecord {
    pub label: String,
    pub status: SegmentStatus,
}

impl SegmentRecord {
    pub fn new(label: impl Into<String>) -> Self {
        SegmentRecord {
            label: label.into(),
            status: SegmentStatus::Pending,
        }
    }
}
