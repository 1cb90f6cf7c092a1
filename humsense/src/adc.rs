//! ADC sample sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use crate::error::Result;

/// A source of raw readings for the sampling task.
///
/// Implementations own their pin or channel configuration. `read` is called
/// once per tick from the sampling task and must not block; a failed read
/// skips that tick.
pub trait AdcSource: Send + 'static {
    fn read(&mut self) -> Result<u16>;
}

/// Software ADC source synthesizing mains hum, for development and tests.
///
/// Produces a rectified hum waveform around a baseline, plus a disturbance
/// level that other tasks can raise through [`disturbance_handle`] to
/// imitate a nearby object changing the coupled field.
///
/// [`disturbance_handle`]: Self::disturbance_handle
pub struct SyntheticMainsAdc {
    baseline: u16,
    hum_amplitude: f32,
    mains_hz: f32,
    sample_hz: f32,
    tick: u64,
    disturbance: Arc<AtomicU16>,
}

impl SyntheticMainsAdc {
    pub fn new(baseline: u16, hum_amplitude: u16, mains_hz: u16, sample_hz: u32) -> Self {
        Self {
            baseline,
            hum_amplitude: f32::from(hum_amplitude),
            mains_hz: f32::from(mains_hz),
            sample_hz: sample_hz as f32,
            tick: 0,
            disturbance: Arc::new(AtomicU16::new(0)),
        }
    }

    /// Handle for raising and lowering the synthetic disturbance level from
    /// outside the sampling task.
    pub fn disturbance_handle(&self) -> Arc<AtomicU16> {
        self.disturbance.clone()
    }
}

impl AdcSource for SyntheticMainsAdc {
    fn read(&mut self) -> Result<u16> {
        let phase = self.tick as f32 * self.mains_hz / self.sample_hz * std::f32::consts::TAU;
        self.tick = self.tick.wrapping_add(1);

        // Rectified hum, the shape an antenna couples off a mains line.
        let hum = (phase.sin().abs() * self.hum_amplitude) as u16;
        let disturbance = self.disturbance.load(Ordering::Relaxed);

        Ok(self
            .baseline
            .saturating_add(hum)
            .saturating_add(disturbance))
    }
}
