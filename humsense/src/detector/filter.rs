//! Raw-sample intake and phase-cancellation of mains hum.

use super::ring::Ring;

/// Slots of raw-sample history kept for the phase comparison.
pub(crate) const RAW_WINDOW: usize = 16;

/// Lookback offset into the raw-sample history used to cancel mains hum.
///
/// The selected slot holds a sample whose AC component opposes the incoming
/// one, so summing the two attenuates the periodic hum while keeping the
/// slow field-coupling component. Only the two common mains frequencies map
/// to an offset; anything else leaves cancellation off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseShift {
    Mains50Hz,
    Mains60Hz,
    /// No cancellation applied; the comparison slot is the oldest sample.
    Disabled,
}

impl PhaseShift {
    pub fn for_mains_hz(hz: u16) -> Self {
        match hz {
            50 => Self::Mains50Hz,
            60 => Self::Mains60Hz,
            _ => Self::Disabled,
        }
    }

    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Index into the oldest-first raw ring.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Mains50Hz => 1,
            Self::Mains60Hz => 2,
            Self::Disabled => 0,
        }
    }
}

/// Front end of the pipeline: absorbs one raw ADC reading per tick and
/// emits the hum-cancelled "rough motion" sum.
#[derive(Debug, Clone)]
pub struct PhaseCancelFilter {
    reads: Ring<u16, RAW_WINDOW>,
    shift: PhaseShift,
}

impl PhaseCancelFilter {
    pub fn new(shift: PhaseShift) -> Self {
        Self {
            reads: Ring::new(),
            shift,
        }
    }

    /// Push `raw` into the history and return the rough-motion sum of the
    /// new sample and its phase-shifted counterpart.
    pub fn ingest(&mut self, raw: u16) -> u32 {
        self.reads.push(raw);
        u32::from(self.reads.get(self.shift.index())) + u32::from(raw)
    }
}
