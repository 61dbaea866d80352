//! Segment range math and per-segment records.
//!
//! A job downloads a 1-based inclusive range of the manifest's segments;
//! records track each segment's fetch state by zero-based ordinal.

mod range;
mod record;

pub use range::SegmentRange;
pub use record::{SegmentRecord, SegmentStatus};
