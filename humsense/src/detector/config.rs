use std::time::Duration;

/// Alarm decision settings. Adjustable at runtime via
/// [`MotionSensor::set_alarm`](crate::sensor::MotionSensor::set_alarm);
/// changes take effect on the next evaluated tick.
#[derive(Debug, Clone, Copy)]
pub struct AlarmSettings {
    /// Minimum shift magnitude required to raise an alarm.
    pub threshold: u16,

    /// Minimum time between two alarm firings.
    pub hold: Duration,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            threshold: 20,
            hold: Duration::from_millis(1_000),
        }
    }
}

/// Pipeline configuration fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Mains frequency used to select the phase-cancellation offset. 50 and
    /// 60 are recognized; any other value disables cancellation.
    pub mains_hz: u16,

    /// Settling window after startup during which alarms are suppressed.
    /// The ADC is too sensitive right after power-up to be trusted.
    pub cooldown: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mains_hz: 60,
            cooldown: Duration::from_secs(2),
        }
    }
}
