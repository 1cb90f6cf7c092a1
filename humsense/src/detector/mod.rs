mod alarm;
mod config;
mod filter;
mod pipeline;
mod ring;
mod shift;
mod smoother;

pub use alarm::{AlarmGate, GateState};
pub use config::{AlarmSettings, DetectorConfig};
pub use filter::{PhaseCancelFilter, PhaseShift};
pub use pipeline::{Detector, TickOutcome};
pub use ring::Ring;
pub use shift::ShiftTracker;
pub use smoother::MotionSmoother;
