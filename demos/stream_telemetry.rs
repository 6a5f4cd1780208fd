//! Full-profile telemetry streaming example
//!
//! Run with: cargo run --example stream_telemetry

use std::sync::Arc;

use nano_sense_ble::{BleTransport, Profile, Result, SessionConfig, SessionDriver};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (minimal)
    tracing_subscriber::fmt().with_env_filter("warn").init();

    println!("Nano Sense Telemetry");
    println!("====================\n");
    println!("Scanning for BLE devices...\n");

    let transport = Arc::new(BleTransport::new().await?);
    let driver = SessionDriver::new(transport, SessionConfig::new(Profile::Full));

    let shutdown = driver.shutdown_handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        println!("\nShutdown signal received. Exiting...");
        shutdown.request_shutdown();
    });

    println!("Listening for BLE messages... Press Ctrl+C to exit.\n");

    driver
        .run(|name, measurement| match measurement {
            Ok(m) => println!("Received {name} data: {m}"),
            Err(e) => eprintln!("Bad {name} packet: {e}"),
        })
        .await
}
