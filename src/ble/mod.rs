//! BLE communication module.
//!
//! This module provides the transport abstraction consumed by the session
//! core, the btleplug-backed production transport, and the UUID constants
//! of the peripheral sketch.

pub mod central;
pub mod transport;
pub mod uuids;

pub use central::BleTransport;
pub use transport::{DeviceDescriptor, Notification, Transport};
pub use uuids::*;
