//! Motion detection via AC-mains electric-field coupling.
//!
//! An antenna wired to an ADC input picks up ambient mains hum; a nearby
//! moving object perturbs the coupled field. This crate turns that effect
//! into discrete alarm events: a fixed-rate sampling task cancels the
//! periodic hum against a phase-shifted sample history, smooths the result
//! through a moving-average cascade, tracks the rate of change of the
//! smoothed level, and applies a threshold-and-hold policy to decide when
//! to alarm.
//!
//! The pipeline itself is pure integer arithmetic over fixed-size circular
//! buffers ([`detector`]); the sampling cadence, cross-task state, and
//! alarm dispatch live in [`sensor`]. Telemetry records for a serial-style
//! plotter are in [`telemetry`].
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use humsense::{MotionSensor, SyntheticMainsAdc, TICK_RATE_HZ};
//!
//! # async fn run() {
//! let adc = SyntheticMainsAdc::new(80, 40, 60, TICK_RATE_HZ);
//! let sensor = MotionSensor::begin(adc, 60, Duration::from_secs(2));
//! sensor.set_alarm(|| println!("motion!"), 20, Duration::from_secs(1));
//!
//! loop {
//!     sensor.check_alarm();
//!     tokio::time::sleep(Duration::from_millis(20)).await;
//! }
//! # }
//! ```

pub mod adc;
pub mod detector;
pub mod error;
pub mod sensor;
pub mod telemetry;

pub use adc::{AdcSource, SyntheticMainsAdc};
pub use detector::{AlarmSettings, DetectorConfig, PhaseShift};
pub use error::{Error, Result};
pub use sensor::{MotionSensor, TICK_RATE_HZ};
pub use telemetry::PlotFrame;
