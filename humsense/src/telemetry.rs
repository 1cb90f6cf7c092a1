//! Plotter-oriented telemetry records.

use std::fmt;

/// Upper/lower chart bound emitted with every live record, and the
/// magnitude the alarm-line sentinel toggles between.
pub const AXIS_BOUND: i32 = 100;

/// One six-field record for a line-oriented plotting sink.
///
/// Field order: upper axis bound, lower axis bound, positive threshold,
/// negative threshold, alarm-line sentinel, current shift. Before the
/// sensor is ready the record is all zeros so the plot stays flat.
/// Purely observational; nothing here feeds back into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotFrame {
    upper: i32,
    lower: i32,
    threshold: i32,
    threshold_mirror: i32,
    alarm_line: i32,
    shift: i32,
}

impl PlotFrame {
    /// Record for a ready sensor.
    pub fn live(threshold: u16, alarm_line: i32, shift: i32) -> Self {
        let threshold = i32::from(threshold);
        Self {
            upper: AXIS_BOUND,
            lower: -AXIS_BOUND,
            threshold,
            threshold_mirror: -threshold,
            alarm_line,
            shift,
        }
    }

    /// Record emitted while the sensor is still cooling down.
    pub fn idle() -> Self {
        Self {
            upper: 0,
            lower: 0,
            threshold: 0,
            threshold_mirror: 0,
            alarm_line: 0,
            shift: 0,
        }
    }
}

impl fmt::Display for PlotFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.upper, self.lower, self.threshold, self.threshold_mirror, self.alarm_line, self.shift
        )
    }
}
