//! Readiness gate and alarm decision.
//!
//! # State Machine
//!
//! ```text
//!                 now >= ready_at
//!  CoolingDown ──────────────────► Ready (terminal)
//! ```
//!
//! - **CoolingDown:** The ADC and filter cascade are still settling after
//!   startup; every alarm decision is suppressed.
//! - **Ready:** Alarms may fire. The gate never leaves this state.
//!
//! Once ready, a tick fires an alarm when the shift magnitude reaches the
//! threshold and at least `hold` milliseconds have passed since the last
//! firing.

/// Readiness states of the detector. `Ready` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    CoolingDown,
    Ready,
}

/// One-way readiness latch plus the threshold-and-hold alarm policy.
#[derive(Debug, Clone)]
pub struct AlarmGate {
    state: GateState,
    /// Earliest time the gate may open.
    ready_at_ms: u64,
    last_alarm_ms: u64,
}

impl AlarmGate {
    pub fn new(now_ms: u64, cooldown_ms: u64) -> Self {
        Self {
            state: GateState::CoolingDown,
            ready_at_ms: now_ms + cooldown_ms,
            last_alarm_ms: 0,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Advance the readiness latch. Returns true on the single tick where
    /// the gate opens.
    pub fn update_readiness(&mut self, now_ms: u64) -> bool {
        if self.state == GateState::CoolingDown && now_ms >= self.ready_at_ms {
            self.state = GateState::Ready;
            return true;
        }
        false
    }

    /// Evaluate the alarm policy for one tick. Returns true when an alarm
    /// fires, recording `now_ms` as the firing time.
    ///
    /// No validation is applied to `threshold` or `hold_ms`; pathological
    /// values degrade behavior rather than fail.
    pub fn evaluate(&mut self, shift: i32, threshold: u16, hold_ms: u64, now_ms: u64) -> bool {
        if self.state != GateState::Ready {
            return false;
        }
        if shift.unsigned_abs() < u32::from(threshold) {
            return false;
        }
        if now_ms < self.last_alarm_ms.saturating_add(hold_ms) {
            return false;
        }

        self.last_alarm_ms = now_ms;
        true
    }
}
