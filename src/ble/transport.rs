//! Abstract BLE transport capability.
//!
//! The session core never talks to a radio directly; it consumes this trait.
//! The production implementation is [`BleTransport`](crate::ble::central::BleTransport)
//! over btleplug, and the integration tests drive the session with a
//! scripted fake.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::error::Result;

/// A peripheral seen during discovery.
///
/// Opaque handle plus human-readable identity. Owned by the session once
/// selected and discarded at session end.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceDescriptor {
    /// Transport-specific peripheral key.
    pub id: String,
    /// Advertised local name.
    pub name: String,
    /// Peripheral address.
    pub address: String,
}

/// A raw notification pushed by the peripheral after subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// UUID of the characteristic that sent the notification.
    pub characteristic: Uuid,
    /// The notification payload.
    pub data: Vec<u8>,
}

/// The BLE capability consumed by the session core.
///
/// Implementations manage a single link at a time: `connect` binds the
/// transport to one peripheral and the characteristic operations apply to
/// that link until `disconnect`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start scanning and return a stream of peripherals whose advertised
    /// name matches `name_filter`.
    ///
    /// The stream stays open until dropped; callers pair it with
    /// [`stop_scan`](Self::stop_scan) so no listener dangles.
    async fn scan(&self, name_filter: &str) -> Result<BoxStream<'static, DeviceDescriptor>>;

    /// Stop an active scan. A no-op if no scan is running.
    async fn stop_scan(&self) -> Result<()>;

    /// Connect to a discovered peripheral and discover its services.
    async fn connect(&self, device: &DeviceDescriptor) -> Result<()>;

    /// The characteristic identifiers exposed by the connected peripheral.
    async fn characteristics(&self) -> Result<HashSet<Uuid>>;

    /// Enable notifications on a characteristic.
    async fn subscribe(&self, characteristic: Uuid) -> Result<()>;

    /// Disable notifications on a characteristic.
    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()>;

    /// Tear down the link to the peripheral.
    async fn disconnect(&self) -> Result<()>;

    /// Stream of notifications from all subscribed characteristics.
    ///
    /// The stream ends when the transport loses the link.
    async fn notifications(&self) -> Result<BoxStream<'static, Notification>>;
}
