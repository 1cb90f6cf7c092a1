//! Motion sensing daemon.
//!
//! Runs the detector against a synthetic mains-hum ADC source and streams
//! plotter telemetry to stdout. A disturbance is injected every few seconds
//! so the alarm path can be observed without hardware.

use std::env;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use humsense::{MotionSensor, SyntheticMainsAdc, TICK_RATE_HZ};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Optional first argument: mains frequency (default 60).
    let mains_hz: u16 = match env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(hz) => hz,
            Err(_) => {
                eprintln!("Usage: humsensed [mains_hz]");
                std::process::exit(1);
            }
        },
        None => 60,
    };

    let adc = SyntheticMainsAdc::new(80, 40, mains_hz, TICK_RATE_HZ);
    let disturbance = adc.disturbance_handle();

    let sensor = MotionSensor::begin(adc, mains_hz, Duration::from_secs(2));
    sensor.set_alarm(
        || info!("motion detected"),
        20,
        Duration::from_secs(1),
    );

    // Wave a synthetic hand at the antenna every few seconds.
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            disturbance.store(60, Ordering::Relaxed);
            tokio::time::sleep(Duration::from_millis(400)).await;
            disturbance.store(0, Ordering::Relaxed);
        }
    });

    let mut stdout = std::io::stdout();
    let mut plot = tokio::time::interval(Duration::from_millis(20));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = plot.tick() => {
                sensor.check_alarm();
                sensor.print_data(&mut stdout)?;
                stdout.flush()?;
            }
        }
    }

    sensor.end();
    info!("shutting down");
    Ok(())
}
