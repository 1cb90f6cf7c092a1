//! The per-tick detection pipeline.
//!
//! Ties the stages together in their fixed order: sample intake and
//! phase-cancellation, moving-average smoothing, shift extraction, alarm
//! decision. One call to [`Detector::tick`] is one tick; the struct owns
//! every piece of pipeline state for its whole lifetime.
//!
//! Everything here is synchronous, allocation-free, and integer-only, so
//! the pipeline behaves identically whether it is driven by the 500 Hz
//! sampling task or directly by a test.

use tracing::warn;

use super::alarm::AlarmGate;
use super::config::{AlarmSettings, DetectorConfig};
use super::filter::{PhaseCancelFilter, PhaseShift};
use super::shift::ShiftTracker;
use super::smoother::MotionSmoother;

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// The signed shift value after this tick.
    pub shift: i32,

    /// True on the one tick where the readiness gate opened.
    pub became_ready: bool,

    /// True when this tick raised an alarm.
    pub alarm: bool,
}

/// The complete detection pipeline for one sensor channel.
pub struct Detector {
    filter: PhaseCancelFilter,
    smoother: MotionSmoother,
    tracker: ShiftTracker,
    gate: AlarmGate,
    shift: i32,
}

impl Detector {
    /// Build a zeroed pipeline. `now_ms` anchors the cooldown gate; the
    /// caller's clock must feed consistent values to [`tick`](Self::tick).
    pub fn new(config: DetectorConfig, now_ms: u64) -> Self {
        let phase = PhaseShift::for_mains_hz(config.mains_hz);
        if phase.is_disabled() {
            warn!(
                mains_hz = config.mains_hz,
                "unrecognized mains frequency, phase cancellation disabled"
            );
        }

        Self {
            filter: PhaseCancelFilter::new(phase),
            smoother: MotionSmoother::new(),
            tracker: ShiftTracker::new(),
            gate: AlarmGate::new(now_ms, config.cooldown.as_millis() as u64),
            shift: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    /// Advance the readiness latch without consuming a sample. Returns true
    /// on the opening transition. [`tick`](Self::tick) advances the latch
    /// too; this exists so a caller can keep readiness moving on ticks
    /// where no sample was available.
    pub fn poll_readiness(&mut self, now_ms: u64) -> bool {
        self.gate.update_readiness(now_ms)
    }

    /// The signed shift value from the most recent tick.
    pub fn shift(&self) -> i32 {
        self.shift
    }

    /// Run one tick of the pipeline over a fresh raw sample.
    pub fn tick(&mut self, raw: u16, now_ms: u64, settings: &AlarmSettings) -> TickOutcome {
        let became_ready = self.gate.update_readiness(now_ms);

        let rough_motion = self.filter.ingest(raw);
        let motion_level = self.smoother.ingest(rough_motion);
        self.shift = self.tracker.ingest(motion_level);

        let alarm = self.gate.evaluate(
            self.shift,
            settings.threshold,
            settings.hold.as_millis() as u64,
            now_ms,
        );

        TickOutcome {
            shift: self.shift,
            became_ready,
            alarm,
        }
    }
}
