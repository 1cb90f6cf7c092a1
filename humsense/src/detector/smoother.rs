//! Moving-average smoothing of the rough-motion stream.

use super::ring::Ring;

/// Slots in the smoothing window. At the 500 Hz tick rate this spans 64 ms,
/// which is the main smoothing control of the pipeline.
pub(crate) const SMOOTHING_WINDOW: usize = 32;

/// Averages the most recent rough-motion values into a motion level.
#[derive(Debug, Clone)]
pub struct MotionSmoother {
    averages: Ring<u32, SMOOTHING_WINDOW>,
}

impl MotionSmoother {
    pub fn new() -> Self {
        Self {
            averages: Ring::new(),
        }
    }

    /// Push `rough_motion` and return the truncating mean of the whole
    /// window. The window is unsigned, so the result is never negative.
    pub fn ingest(&mut self, rough_motion: u32) -> i32 {
        self.averages.push(rough_motion);
        let sum: u64 = self.averages.iter().map(u64::from).sum();
        (sum / SMOOTHING_WINDOW as u64) as i32
    }
}

impl Default for MotionSmoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_average_over_the_zero_fill_during_warmup() {
        let mut smoother = MotionSmoother::new();

        // One value of 64 against 31 zeros.
        assert_eq!(smoother.ingest(64), 2);
    }

    #[test]
    fn should_truncate_the_mean() {
        let mut smoother = MotionSmoother::new();

        assert_eq!(smoother.ingest(31), 0);
    }

    #[test]
    fn should_settle_on_a_constant_input() {
        let mut smoother = MotionSmoother::new();
        let mut level = 0;
        for _ in 0..SMOOTHING_WINDOW {
            level = smoother.ingest(200);
        }

        assert_eq!(level, 200);
        assert_eq!(smoother.ingest(200), 200);
    }

    #[test]
    fn should_stay_non_negative_for_any_input() {
        let mut smoother = MotionSmoother::new();
        for v in [0, u32::from(u16::MAX) * 2, 1, 131_070, 0, 77] {
            assert!(smoother.ingest(v) >= 0);
        }
    }

    #[test]
    fn should_not_overflow_on_a_full_window_of_maximum_sums() {
        let mut smoother = MotionSmoother::new();
        let max_rough = u32::from(u16::MAX) * 2;
        let mut level = 0;
        for _ in 0..SMOOTHING_WINDOW {
            level = smoother.ingest(max_rough);
        }

        assert_eq!(level, max_rough as i32);
    }
}
