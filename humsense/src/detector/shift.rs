//! Rate-of-change extraction over the motion-level history.

use super::ring::Ring;

/// Slots of motion-level history; 128 ms of lookback at the 500 Hz tick
/// rate.
pub(crate) const SHIFT_WINDOW: usize = 64;

/// Compares each new motion level against the oldest retained one.
///
/// The difference is negated, so a drop in the smoothed level reads as a
/// positive shift. This signed value is the primary motion output of the
/// whole pipeline.
#[derive(Debug, Clone)]
pub struct ShiftTracker {
    record: Ring<i32, SHIFT_WINDOW>,
}

impl ShiftTracker {
    pub fn new() -> Self {
        Self {
            record: Ring::new(),
        }
    }

    /// Push `motion_level` and return the signed shift against the oldest
    /// retained level (the ring's zero-fill during warmup).
    pub fn ingest(&mut self, motion_level: i32) -> i32 {
        self.record.push(motion_level);
        -(motion_level - self.record.oldest())
    }
}

impl Default for ShiftTracker {
    fn default() -> Self {
        Self::new()
    }
}
