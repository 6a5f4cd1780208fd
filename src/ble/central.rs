//! btleplug-backed transport.
//!
//! Implements [`Transport`] on top of the platform BLE stack: adapter
//! acquisition, advertisement filtering by local name, service discovery
//! with a characteristic cache, and the notification stream.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use btleplug::api::{Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::{BoxStream, StreamExt};
use parking_lot::RwLock;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::ble::transport::{DeviceDescriptor, Notification, Transport};
use crate::error::{Error, Result};

/// Production [`Transport`] over btleplug.
pub struct BleTransport {
    /// The BLE adapter used for scanning and connections.
    adapter: Adapter,
    /// Peripherals seen during the current scan, keyed by peripheral id.
    discovered: Arc<RwLock<HashMap<String, Peripheral>>>,
    /// The connected peripheral, if any.
    peripheral: RwLock<Option<Peripheral>>,
    /// Cached characteristics of the connected peripheral.
    characteristics: RwLock<HashMap<Uuid, Characteristic>>,
}

impl BleTransport {
    /// Create a transport on the first available Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|_e| Error::BluetoothUnavailable)?;

        let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(Error::BluetoothUnavailable)?;

        info!(
            "Using Bluetooth adapter: {:?}",
            adapter.adapter_info().await.ok()
        );

        Ok(Self::with_adapter(adapter))
    }

    /// Create a transport on a specific adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self {
            adapter,
            discovered: Arc::new(RwLock::new(HashMap::new())),
            peripheral: RwLock::new(None),
            characteristics: RwLock::new(HashMap::new()),
        }
    }

    fn connected_peripheral(&self) -> Result<Peripheral> {
        self.peripheral
            .read()
            .clone()
            .ok_or_else(|| Error::Internal("no connected peripheral".to_string()))
    }

    fn cached_characteristic(&self, uuid: Uuid) -> Result<Characteristic> {
        self.characteristics
            .read()
            .get(&uuid)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("characteristic {uuid} not discovered")))
    }
}

#[async_trait]
impl Transport for BleTransport {
    async fn scan(&self, name_filter: &str) -> Result<BoxStream<'static, DeviceDescriptor>> {
        let events = self.adapter.events().await.map_err(Error::Bluetooth)?;

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(Error::Bluetooth)?;

        debug!(filter = name_filter, "BLE scan started");

        let adapter = self.adapter.clone();
        let discovered = self.discovered.clone();
        let target = name_filter.to_string();

        let stream = events
            .filter_map(move |event| {
                let adapter = adapter.clone();
                let discovered = discovered.clone();
                let target = target.clone();
                async move {
                    let id = match event {
                        CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                        _ => return None,
                    };

                    let peripheral = adapter.peripheral(&id).await.ok()?;
                    let properties = peripheral.properties().await.ok()??;
                    let name = properties.local_name?;
                    if name != target {
                        trace!(%name, "ignoring advertisement");
                        return None;
                    }

                    let key = id.to_string();
                    discovered.write().insert(key.clone(), peripheral);

                    Some(DeviceDescriptor {
                        id: key,
                        name,
                        address: properties.address.to_string(),
                    })
                }
            })
            .boxed();

        Ok(stream)
    }

    async fn stop_scan(&self) -> Result<()> {
        self.adapter.stop_scan().await.map_err(Error::Bluetooth)?;
        debug!("BLE scan stopped");
        Ok(())
    }

    async fn connect(&self, device: &DeviceDescriptor) -> Result<()> {
        let peripheral = self
            .discovered
            .read()
            .get(&device.id)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("unknown peripheral {}", device.id)))?;

        peripheral.connect().await.map_err(Error::Bluetooth)?;
        info!(address = %device.address, "connected to peripheral");

        peripheral
            .discover_services()
            .await
            .map_err(Error::Bluetooth)?;

        let mut cache = self.characteristics.write();
        cache.clear();
        for service in peripheral.services() {
            for characteristic in service.characteristics {
                debug!(
                    "Found characteristic: {} in service {}",
                    characteristic.uuid, service.uuid
                );
                cache.insert(characteristic.uuid, characteristic);
            }
        }
        drop(cache);

        *self.peripheral.write() = Some(peripheral);
        Ok(())
    }

    async fn characteristics(&self) -> Result<HashSet<Uuid>> {
        self.connected_peripheral()?;
        Ok(self.characteristics.read().keys().copied().collect())
    }

    async fn subscribe(&self, characteristic: Uuid) -> Result<()> {
        let peripheral = self.connected_peripheral()?;
        let target = self.cached_characteristic(characteristic)?;

        peripheral
            .subscribe(&target)
            .await
            .map_err(Error::Bluetooth)?;

        debug!(%characteristic, "subscribed to notifications");
        Ok(())
    }

    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()> {
        let peripheral = self.connected_peripheral()?;
        let target = self.cached_characteristic(characteristic)?;

        peripheral
            .unsubscribe(&target)
            .await
            .map_err(Error::Bluetooth)?;

        debug!(%characteristic, "unsubscribed from notifications");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let peripheral = self.peripheral.write().take();
        self.characteristics.write().clear();

        if let Some(peripheral) = peripheral {
            peripheral.disconnect().await.map_err(Error::Bluetooth)?;
            info!("disconnected from peripheral");
        }

        Ok(())
    }

    async fn notifications(&self) -> Result<BoxStream<'static, Notification>> {
        let peripheral = self.connected_peripheral()?;

        let stream = peripheral
            .notifications()
            .await
            .map_err(Error::Bluetooth)?
            .map(|n| Notification {
                characteristic: n.uuid,
                data: n.value,
            })
            .boxed();

        Ok(stream)
    }
}
