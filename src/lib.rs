// Allow holding locks across await points - we use parking_lot which is designed for this
#![allow(clippy::await_holding_lock)]
// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # nano-sense-ble
//!
//! A cross-platform Rust client for streaming sensor telemetry from an
//! Arduino Nano BLE Sense peripheral over Bluetooth Low Energy.
//!
//! The client connects to a single peripheral advertising a known name,
//! verifies the required GATT characteristics are present, subscribes to
//! notifications on each, decodes the little-endian payloads into typed
//! measurements, and forwards them to a caller-supplied sink. Shutdown
//! deterministically unsubscribes everything before disconnecting.
//!
//! ## Features
//!
//! - **Device discovery**: scan for the peripheral by advertised name with
//!   a bounded timeout
//! - **Characteristic validation**: fail fast if the sketch on the device
//!   does not expose the expected characteristics
//! - **Typed measurements**: acceleration, rotation, magnetometer,
//!   temperature, or a timing-only elapsed counter
//! - **Two profiles**: full telemetry or timing-only, selected up front
//! - **Graceful teardown**: operator cancellation and link loss share one
//!   unsubscribe-then-disconnect path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nano_sense_ble::{BleTransport, Profile, Result, SessionConfig, SessionDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let transport = Arc::new(BleTransport::new().await?);
//!     let driver = SessionDriver::new(transport, SessionConfig::new(Profile::Full));
//!
//!     let shutdown = driver.shutdown_handle();
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         shutdown.request_shutdown();
//!     });
//!
//!     driver
//!         .run(|name, measurement| match measurement {
//!             Ok(m) => println!("Received {name} data: {m}"),
//!             Err(e) => eprintln!("Bad {name} packet: {e}"),
//!         })
//!         .await
//! }
//! ```
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Add `NSBluetoothAlwaysUsageDescription`
//! to your Info.plist for bundled apps.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for data types

// Public modules
pub mod ble;
pub mod driver;
pub mod error;
pub mod measurement;
pub mod registry;
pub mod router;
pub mod session;
pub mod timing;

// Re-exports for convenience
pub use driver::{SessionConfig, SessionDriver, SessionEvent, ShutdownHandle};
pub use error::{DecodeError, Error, Result};
pub use measurement::{Measurement, MeasurementKind};
pub use registry::{CharacteristicSpec, Profile};
pub use router::NotificationRouter;
pub use session::{DeviceSession, SessionState};
pub use timing::IntervalStats;

// Re-export commonly used types from submodules
pub use ble::central::BleTransport;
pub use ble::transport::{DeviceDescriptor, Notification, Transport};
pub use ble::uuids::DEFAULT_DEVICE_NAME;
