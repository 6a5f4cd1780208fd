//! Transmission timing example using the timing-only profile.
//!
//! Streams the peripheral's elapsed-time characteristic and reports the
//! distribution of inter-arrival gaps on exit.
//!
//! Run with: cargo run --example speed_test

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use nano_sense_ble::{
    BleTransport, IntervalStats, Profile, Result, SessionConfig, SessionDriver,
};

/// Gap considered a late packet, two notification periods of the sketch.
const LATE_THRESHOLD: Duration = Duration::from_millis(32);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    println!("Nano Sense Speed Test");
    println!("=====================\n");
    println!("Scanning for BLE devices...\n");

    let transport = Arc::new(BleTransport::new().await?);
    let driver = SessionDriver::new(transport, SessionConfig::new(Profile::TimingOnly));

    let shutdown = driver.shutdown_handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        println!("\nShutdown signal received. Exiting...");
        shutdown.request_shutdown();
    });

    println!("Listening for BLE messages... Press Ctrl+C to exit.\n");

    let stats = Arc::new(Mutex::new(IntervalStats::new()));
    let sink_stats = stats.clone();

    driver
        .run(move |_name, measurement| {
            if measurement.is_ok() {
                sink_stats.lock().record();
            }
        })
        .await?;

    let stats = stats.lock();
    if stats.is_empty() {
        println!("No packets received.");
        return Ok(());
    }

    let late = stats.fraction_above(LATE_THRESHOLD) * 100.0;
    println!("-> Packets: {}", stats.count() + 1);
    println!(
        "-> Percentage > {} ms: {late:.2}",
        LATE_THRESHOLD.as_millis()
    );
    if let Some(mean) = stats.mean() {
        println!("-> Mean time: {:.3} ms", mean.as_secs_f64() * 1000.0);
    }
    if let Some(median) = stats.median() {
        println!("-> Median time: {:.3} ms", median.as_secs_f64() * 1000.0);
    }
    if let Some(max) = stats.max() {
        println!("-> Max time: {:.3} ms", max.as_secs_f64() * 1000.0);
    }

    Ok(())
}
