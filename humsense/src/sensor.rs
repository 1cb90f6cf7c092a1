//! The sampling task and the main-context sensor handle.
//!
//! [`MotionSensor::begin`] spawns a task that drives the detection pipeline
//! at a fixed 500 Hz cadence; the handle it returns is the only way the
//! rest of the program talks to the pipeline. Every value crossing the task
//! boundary is a single word: the sampling task is the sole writer of the
//! shift, readiness, and alarm-pending cells, and the handle only ever
//! clears the pending flag after disabling ticks for the duration of the
//! user callback.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::adc::AdcSource;
use crate::detector::{AlarmSettings, Detector, DetectorConfig};
use crate::telemetry::{AXIS_BOUND, PlotFrame};

/// Tick rate of the sampling task.
pub const TICK_RATE_HZ: u32 = 500;

const TICK_PERIOD: Duration = Duration::from_millis(1_000 / TICK_RATE_HZ as u64);

/// User code run synchronously from [`MotionSensor::check_alarm`] when an
/// alarm is pending.
pub type AlarmCallback = Box<dyn FnMut() + Send>;

/// State shared between the sampling task and the handle. All single-word
/// cells; no locks on the tick path.
struct Shared {
    shift: AtomicI32,
    ready: AtomicBool,
    /// Set only by the sampling task, cleared only by `check_alarm`.
    alarm_pending: AtomicBool,
    /// Gated off by `check_alarm` while the user callback runs.
    ticks_enabled: AtomicBool,
}

/// Main-context dispatch state, touched only under the handle's lock.
struct Dispatch {
    callback: Option<AlarmCallback>,
    alarm_line: i32,
}

/// Handle to a running motion sensor.
pub struct MotionSensor {
    shared: Arc<Shared>,
    settings_tx: watch::Sender<AlarmSettings>,
    dispatch: Mutex<Dispatch>,
    cancel: CancellationToken,
}

impl MotionSensor {
    /// Start sensing on the given ADC source.
    ///
    /// Selects the phase-cancellation offset from `mains_hz` (50 or 60; any
    /// other value applies no cancellation), arms the readiness gate to
    /// open `cooldown` after now, and spawns the 500 Hz sampling task.
    /// Alarm settings start at their defaults until [`set_alarm`] is
    /// called. Must be called within a tokio runtime.
    ///
    /// [`set_alarm`]: Self::set_alarm
    pub fn begin<A: AdcSource>(adc: A, mains_hz: u16, cooldown: Duration) -> Self {
        let shared = Arc::new(Shared {
            shift: AtomicI32::new(0),
            ready: AtomicBool::new(false),
            alarm_pending: AtomicBool::new(false),
            ticks_enabled: AtomicBool::new(true),
        });
        let (settings_tx, settings_rx) = watch::channel(AlarmSettings::default());
        let cancel = CancellationToken::new();

        let task = SamplerTask {
            adc,
            detector: Detector::new(DetectorConfig { mains_hz, cooldown }, 0),
            shared: shared.clone(),
            settings_rx,
            started: Instant::now(),
        };
        tokio::spawn(task.run(cancel.clone()));
        info!(
            mains_hz,
            cooldown_ms = cooldown.as_millis() as u64,
            "motion sensor started"
        );

        Self {
            shared,
            settings_tx,
            dispatch: Mutex::new(Dispatch {
                callback: None,
                alarm_line: -AXIS_BOUND,
            }),
            cancel,
        }
    }

    /// Stop the sampling task. No further ticks occur; the last shift value
    /// stays readable.
    pub fn end(&self) {
        self.cancel.cancel();
    }

    /// Install the alarm callback and override the threshold and hold
    /// settings. Takes effect on the next evaluated tick.
    pub fn set_alarm(&self, callback: impl FnMut() + Send + 'static, threshold: u16, hold: Duration) {
        self.dispatch.lock().callback = Some(Box::new(callback));
        self.settings_tx.send_replace(AlarmSettings { threshold, hold });
        debug!(threshold, hold_ms = hold.as_millis() as u64, "alarm configured");
    }

    /// The current shift value. Plain atomic read, safe from any context;
    /// last-writer-wins against the sampling task.
    pub fn level(&self) -> i32 {
        self.shared.shift.load(Ordering::Acquire)
    }

    /// Dispatch a pending alarm, if any; otherwise a no-op. Poll this from
    /// the main context.
    ///
    /// Ticks are gated off before the callback runs and restored after, so
    /// the callback can never observe a mid-flight pipeline update or be
    /// re-entered by one.
    pub fn check_alarm(&self) {
        if !self.shared.alarm_pending.load(Ordering::Acquire) {
            return;
        }

        self.shared.ticks_enabled.store(false, Ordering::Release);
        let mut dispatch = self.dispatch.lock();
        match dispatch.callback.as_mut() {
            Some(callback) => callback(),
            None => debug!("alarm fired with no callback installed"),
        }
        self.shared.ticks_enabled.store(true, Ordering::Release);
        self.shared.alarm_pending.store(false, Ordering::Release);

        dispatch.alarm_line = -dispatch.alarm_line;
    }

    /// Write one telemetry record to `out`: six zeros while cooling down,
    /// otherwise the axis bounds, mirrored threshold, alarm line, and
    /// current shift.
    pub fn print_data<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let frame = if self.shared.ready.load(Ordering::Acquire) {
            let threshold = self.settings_tx.borrow().threshold;
            PlotFrame::live(threshold, self.dispatch.lock().alarm_line, self.level())
        } else {
            PlotFrame::idle()
        };
        writeln!(out, "{frame}")
    }
}

impl Drop for MotionSensor {
    fn drop(&mut self) {
        // A dropped handle must not leave the sampling task running.
        self.cancel.cancel();
    }
}

struct SamplerTask<A> {
    adc: A,
    detector: Detector,
    shared: Arc<Shared>,
    settings_rx: watch::Receiver<AlarmSettings>,
    started: Instant,
}

impl<A: AdcSource> SamplerTask<A> {
    async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => self.tick(),
            }
        }

        trace!("sampler task stopped");
    }

    fn tick(&mut self) {
        if !self.shared.ticks_enabled.load(Ordering::Acquire) {
            return;
        }

        let now_ms = self.started.elapsed().as_millis() as u64;
        // Readiness is purely time-based and must keep advancing even on
        // ticks where the ADC produces nothing.
        if self.detector.poll_readiness(now_ms) {
            self.shared.ready.store(true, Ordering::Release);
            info!(elapsed_ms = now_ms, "cooldown elapsed, alarms armed");
        }

        let raw = match self.adc.read() {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "ADC read failed, skipping tick");
                return;
            }
        };

        let settings = *self.settings_rx.borrow();
        let outcome = self.detector.tick(raw, now_ms, &settings);

        self.shared.shift.store(outcome.shift, Ordering::Release);
        if outcome.alarm {
            self.shared.alarm_pending.store(true, Ordering::Release);
            debug!(
                shift = outcome.shift,
                threshold = settings.threshold,
                "alarm raised"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::AtomicUsize;

    use tokio::time;

    use super::*;
    use crate::error::Error;

    // All tests use start_paused so the 500 Hz interval is driven
    // deterministically by time::sleep.

    /// Emits `low` until `step_after` reads, then `high` forever.
    struct StepAdc {
        low: u16,
        high: u16,
        step_after: u64,
        reads: Arc<AtomicUsize>,
    }

    impl StepAdc {
        fn new(low: u16, high: u16, step_after: u64) -> Self {
            Self {
                low,
                high,
                step_after,
                reads: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn read_counter(&self) -> Arc<AtomicUsize> {
            self.reads.clone()
        }
    }

    impl AdcSource for StepAdc {
        fn read(&mut self) -> crate::error::Result<u16> {
            let n = self.reads.fetch_add(1, Ordering::Relaxed) as u64;
            Ok(if n < self.step_after { self.low } else { self.high })
        }
    }

    struct FailingAdc;

    impl AdcSource for FailingAdc {
        fn read(&mut self) -> crate::error::Result<u16> {
            Err(Error::Adc(io::Error::other("adc offline")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_settle_level_to_zero_on_a_constant_source() {
        let adc = StepAdc::new(100, 100, u64::MAX);
        let sensor = MotionSensor::begin(adc, 50, Duration::from_millis(100));

        time::sleep(Duration::from_secs(2)).await;

        assert_eq!(sensor.level(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_dispatch_the_alarm_exactly_once_per_firing() {
        // Step after 1000 reads (2 s), well past cooldown and hold.
        let adc = StepAdc::new(100, 400, 1_000);
        let sensor = MotionSensor::begin(adc, 50, Duration::from_millis(100));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        sensor.set_alarm(
            move || {
                counter.fetch_add(1, Ordering::Relaxed);
            },
            20,
            Duration::from_millis(1_000),
        );

        // Baseline phase: nothing to dispatch.
        time::sleep(Duration::from_secs(2)).await;
        sensor.check_alarm();
        assert_eq!(fired.load(Ordering::Relaxed), 0);

        // The step lands; one alarm is raised and dispatched once.
        time::sleep(Duration::from_millis(200)).await;
        sensor.check_alarm();
        sensor.check_alarm();
        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_dispatch_without_a_pending_alarm() {
        let adc = StepAdc::new(100, 100, u64::MAX);
        let sensor = MotionSensor::begin(adc, 60, Duration::from_millis(100));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        sensor.set_alarm(
            move || {
                counter.fetch_add(1, Ordering::Relaxed);
            },
            20,
            Duration::from_millis(1_000),
        );

        time::sleep(Duration::from_secs(2)).await;
        sensor.check_alarm();

        assert_eq!(fired.load(Ordering::Relaxed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_reading_after_end() {
        let adc = StepAdc::new(100, 100, u64::MAX);
        let reads = adc.read_counter();
        let sensor = MotionSensor::begin(adc, 50, Duration::from_millis(100));

        time::sleep(Duration::from_millis(500)).await;
        sensor.end();
        time::sleep(Duration::from_millis(10)).await;

        let frozen = reads.load(Ordering::Relaxed);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(reads.load(Ordering::Relaxed), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn should_print_six_zeros_before_readiness() {
        let adc = StepAdc::new(100, 100, u64::MAX);
        let sensor = MotionSensor::begin(adc, 50, Duration::from_secs(60));

        time::sleep(Duration::from_millis(500)).await;

        let mut out = Vec::new();
        sensor.print_data(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\t0\t0\t0\t0\t0\n");
    }

    #[tokio::test(start_paused = true)]
    async fn should_print_the_live_record_once_ready() {
        let adc = StepAdc::new(100, 100, u64::MAX);
        let sensor = MotionSensor::begin(adc, 50, Duration::from_millis(100));
        sensor.set_alarm(|| {}, 25, Duration::from_secs(1));

        time::sleep(Duration::from_secs(2)).await;

        let mut out = Vec::new();
        sensor.print_data(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "100\t-100\t25\t-25\t-100\t0\n");
    }

    #[tokio::test(start_paused = true)]
    async fn should_toggle_the_alarm_line_on_each_dispatch() {
        let adc = StepAdc::new(100, 400, 1_000);
        let sensor = MotionSensor::begin(adc, 50, Duration::from_millis(100));
        sensor.set_alarm(|| {}, 20, Duration::from_millis(1_000));

        time::sleep(Duration::from_millis(2_200)).await;
        sensor.check_alarm();

        let mut out = Vec::new();
        sensor.print_data(&mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        let alarm_line: i32 = line.trim_end().split('\t').nth(4).unwrap().parse().unwrap();
        assert_eq!(alarm_line, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_ticks_when_the_adc_fails_but_keep_readiness_moving() {
        let sensor = MotionSensor::begin(FailingAdc, 60, Duration::from_millis(100));

        time::sleep(Duration::from_secs(2)).await;

        // No sample was ever consumed, so the shift stays at its initial
        // zero; readiness is time-based and still opened.
        assert_eq!(sensor.level(), 0);
        let mut out = Vec::new();
        sensor.print_data(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "100\t-100\t20\t-20\t-100\t0\n");
    }
}
