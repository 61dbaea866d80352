//! Inclusive 1-based segment range selection.

use serde::Serialize;

/// The part of a media manifest a job downloads: segments `start..=end`, 1-based.
///
/// Always satisfies `1 <= start <= end <= segment count` and
/// `target == end - start + 1` once built with [`SegmentRange::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentRange {
    /// First segment (1-based, inclusive).
    pub start: usize,
    /// Last segment (1-based, inclusive).
    pub end: usize,
    /// Number of segments in the range.
    pub target: usize,
}

impl SegmentRange {
    /// Builds a range from optional user bounds for a manifest with `count` segments.
    ///
    /// A missing start defaults to 1 and a missing end to `count`; both are
    /// clamped to `[1, count]` and swapped when reversed. `count == 0` yields
    /// the degenerate range `1..=1`, which callers reject before creating a job.
    pub fn clamp(start: Option<usize>, end: Option<usize>, count: usize) -> Self {
        let upper = count.max(1);
        let start = start.unwrap_or(1).clamp(1, upper);
        let end = end.unwrap_or(upper).clamp(1, upper);
        let (start, end) = (start.min(end), start.max(end));
        SegmentRange {
            start,
            end,
            target: end - start + 1,
        }
    }

    /// Range covering every segment.
    pub fn full(count: usize) -> Self {
        Self::clamp(None, None, count)
    }

    /// Zero-based ordinal of the first segment.
    pub fn first_index(&self) -> usize {
        self.start - 1
    }

    /// Zero-based exclusive end ordinal.
    pub fn end_index(&self) -> usize {
        self.end
    }

    /// True if zero-based `index` lies inside the range.
    pub fn contains_index(&self, index: usize) -> bool {
        index >= self.first_index() && index < self.end_index()
    }

    /// Position of zero-based `index` within the range (0 for the first segment).
    pub fn slot(&self, index: usize) -> usize {
        index - self.first_index()
    }
}
