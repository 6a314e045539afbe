//! Half-open interval overlap for screenings in the same room.

use chrono::Duration;

use crate::types::Timestamp;

/// A screening's occupied time span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Interval for a show starting at `start` that runs `duration_minutes`.
    pub fn from_duration(start: Timestamp, duration_minutes: i32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(duration_minutes)),
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

/// Whether `[start_a, end_a)` and `[start_b, end_b)` intersect.
///
/// Back-to-back intervals (`end_a == start_b`) do not overlap, so a room can
/// start the next show the minute the previous one ends.
pub fn overlaps(start_a: Timestamp, end_a: Timestamp, start_b: Timestamp, end_b: Timestamp) -> bool {
    start_a < end_b && start_b < end_a
}
