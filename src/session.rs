//! Device session state machine.
//!
//! Owns the lifecycle of a single peripheral link: discovery, connection,
//! characteristic validation, subscription management, and graceful
//! teardown. This is the only stateful component; every phase can fail
//! independently and leaves the session in a well-defined state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ble::transport::{DeviceDescriptor, Transport};
use crate::error::{Error, Result};
use crate::registry::{CharacteristicSpec, Profile};

/// Lifecycle state of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No link and no scan in progress.
    #[default]
    Idle,
    /// Listening for advertisements.
    Scanning,
    /// Link established, characteristics not yet validated.
    Connected,
    /// All required characteristics are present.
    Validated,
    /// Notifications are enabled on every required characteristic.
    Subscribed,
    /// Teardown has been requested or is in progress.
    ShuttingDown,
    /// The session is finished and cannot be reused.
    Closed,
}

impl SessionState {
    /// Check if the session holds an open link.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Validated | Self::Subscribed)
    }

    /// Check if the session has finished.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Scanning => write!(f, "Scanning"),
            Self::Connected => write!(f, "Connected"),
            Self::Validated => write!(f, "Validated"),
            Self::Subscribed => write!(f, "Subscribed"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// State machine managing one peripheral link end to end.
///
/// The session is single-owner: all operations take `&mut self`, and the
/// subscription set is mutated only here, never from notification delivery.
pub struct DeviceSession {
    /// The transport capability.
    transport: Arc<dyn Transport>,
    /// The characteristic set this session requires.
    profile: Profile,
    /// Current lifecycle state.
    state: SessionState,
    /// Candidate selected by discovery, until the session closes.
    device: Option<DeviceDescriptor>,
    /// Whether the transport link is currently open.
    link_open: bool,
    /// Active subscriptions, in subscription order.
    subscriptions: Vec<&'static CharacteristicSpec>,
}

impl DeviceSession {
    /// Create an idle session over a transport.
    pub fn new(transport: Arc<dyn Transport>, profile: Profile) -> Self {
        Self {
            transport,
            profile,
            state: SessionState::Idle,
            device: None,
            link_open: false,
            subscriptions: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The profile this session validates and subscribes against.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// The device selected by discovery, if any.
    pub fn device(&self) -> Option<&DeviceDescriptor> {
        self.device.as_ref()
    }

    /// Check whether notifications are active for a characteristic.
    pub fn is_subscribed(&self, characteristic: Uuid) -> bool {
        self.subscriptions.iter().any(|s| s.uuid == characteristic)
    }

    fn expect_state(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Scan until a peripheral advertising exactly `target_name` appears.
    ///
    /// Takes the first match and stops listening; peripherals sharing the
    /// name are not disambiguated. On timeout the scan is abandoned cleanly
    /// and the session returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryTimeout`] if no match arrives in time.
    pub async fn discover(&mut self, target_name: &str, timeout: Duration) -> Result<()> {
        self.expect_state(SessionState::Idle, "discover")?;

        info!(name = target_name, ?timeout, "scanning for peripheral");
        self.state = SessionState::Scanning;

        let mut adverts = match self.transport.scan(target_name).await {
            Ok(stream) => stream,
            Err(e) => {
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        let found = tokio::time::timeout(timeout, async {
            while let Some(device) = adverts.next().await {
                // The transport may pre-filter; the name check here is
                // authoritative and case-sensitive.
                if device.name == target_name {
                    return Some(device);
                }
                debug!(name = %device.name, "ignoring non-matching advertisement");
            }
            None
        })
        .await;

        drop(adverts);
        if let Err(e) = self.transport.stop_scan().await {
            warn!(error = %e, "failed to stop scan");
        }

        self.state = SessionState::Idle;

        match found {
            Ok(Some(device)) => {
                info!(name = %device.name, address = %device.address, "found device");
                self.device = Some(device);
                Ok(())
            }
            _ => {
                debug!("device not found within the timeout period");
                Err(Error::DiscoveryTimeout {
                    name: target_name.to_string(),
                    timeout,
                })
            }
        }
    }

    /// Connect to the device selected by [`discover`](Self::discover).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectFailed`] if no candidate was discovered or
    /// the transport rejects the connection; the session is back in `Idle`.
    pub async fn connect(&mut self) -> Result<()> {
        self.expect_state(SessionState::Idle, "connect")?;

        let device = self.device.clone().ok_or_else(|| Error::ConnectFailed {
            reason: "no device available to connect to".to_string(),
        })?;

        match self.transport.connect(&device).await {
            Ok(()) => {
                info!(address = %device.address, "connected");
                self.link_open = true;
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to connect");
                self.state = SessionState::Idle;
                Err(Error::ConnectFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Check that every characteristic of the profile is exposed.
    ///
    /// Validation follows registry order and aborts on the first missing
    /// entry, disconnecting before reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCharacteristic`] naming the first missing
    /// entry; the session is back in `Idle` with the link closed.
    pub async fn validate(&mut self) -> Result<()> {
        self.expect_state(SessionState::Connected, "validate")?;

        let available: HashSet<Uuid> = match self.transport.characteristics().await {
            Ok(set) => set,
            Err(e) => {
                self.close_link_after_failure().await;
                return Err(e);
            }
        };

        for spec in self.profile.characteristics() {
            if !available.contains(&spec.uuid) {
                warn!(
                    name = spec.name,
                    uuid = %spec.uuid,
                    "required characteristic not found on device"
                );
                self.close_link_after_failure().await;
                return Err(Error::MissingCharacteristic { name: spec.name });
            }
        }

        info!("all required characteristics are available");
        self.state = SessionState::Validated;
        Ok(())
    }

    /// Enable notifications on every characteristic of the profile, in
    /// registry order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubscribeFailed`] (or [`Error::AlreadySubscribed`])
    /// for the first failing entry. Subscriptions that already succeeded are
    /// rolled back, the link is closed, and the session is back in `Idle`.
    pub async fn subscribe_all(&mut self) -> Result<()> {
        self.expect_state(SessionState::Validated, "subscribe_all")?;

        for spec in self.profile.characteristics() {
            if let Err(e) = self.subscribe(spec).await {
                warn!(name = spec.name, error = %e, "subscription failed, rolling back");
                self.unsubscribe_active().await;
                self.close_link_after_failure().await;
                return Err(e);
            }
            debug!(name = spec.name, "notification started");
        }

        info!(profile = %self.profile, "subscribed to all characteristics");
        self.state = SessionState::Subscribed;
        Ok(())
    }

    /// Enable notifications on a single characteristic.
    ///
    /// Duplicate subscriptions are rejected before touching the transport,
    /// so a handler can never be registered twice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySubscribed`] if notifications are already
    /// active for this characteristic.
    pub async fn subscribe(&mut self, spec: &'static CharacteristicSpec) -> Result<()> {
        if !matches!(
            self.state,
            SessionState::Validated | SessionState::Subscribed
        ) {
            return Err(Error::InvalidState {
                operation: "subscribe",
                state: self.state,
            });
        }

        if self.is_subscribed(spec.uuid) {
            return Err(Error::AlreadySubscribed { name: spec.name });
        }

        self.transport
            .subscribe(spec.uuid)
            .await
            .map_err(|e| Error::SubscribeFailed {
                name: spec.name,
                reason: e.to_string(),
            })?;

        self.subscriptions.push(spec);
        Ok(())
    }

    /// Mark the session as shutting down.
    ///
    /// Only meaningful from `Subscribed`; any other state is left alone so
    /// duplicate signals stay harmless.
    pub fn request_shutdown(&mut self) {
        if self.state == SessionState::Subscribed {
            info!("shutdown requested");
            self.state = SessionState::ShuttingDown;
        } else {
            debug!(state = %self.state, "ignoring shutdown request");
        }
    }

    /// Unconditional, ordered teardown: unsubscribe every active
    /// subscription, then disconnect, then mark `Closed`.
    ///
    /// Individual failures are logged and never re-raised; the session
    /// always reaches `Closed`. Calling teardown on a closed session is a
    /// no-op, so duplicate cancellation signals cannot run it twice.
    pub async fn teardown(&mut self) {
        if self.state.is_closed() {
            debug!("teardown skipped, session already closed");
            return;
        }

        self.state = SessionState::ShuttingDown;

        self.unsubscribe_active().await;

        if self.link_open {
            if let Err(e) = self.transport.disconnect().await {
                warn!(error = %e, "disconnect failed during teardown");
            }
            self.link_open = false;
        }

        self.device = None;
        self.state = SessionState::Closed;
        info!("session closed");
    }

    /// Unsubscribe everything in the subscription set, continuing past
    /// individual errors. Unsubscription must complete before disconnect or
    /// the transport may reject the disconnect over stale handlers.
    async fn unsubscribe_active(&mut self) {
        for spec in self.subscriptions.drain(..) {
            match self.transport.unsubscribe(spec.uuid).await {
                Ok(()) => debug!(name = spec.name, "notification stopped"),
                Err(e) => warn!(name = spec.name, error = %e, "unsubscribe failed"),
            }
        }
    }

    /// Close the link after a validation or subscription failure and return
    /// to `Idle`, ignoring the disconnect outcome.
    async fn close_link_after_failure(&mut self) {
        if self.link_open {
            if let Err(e) = self.transport.disconnect().await {
                warn!(error = %e, "disconnect after phase failure failed");
            }
            self.link_open = false;
        }
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_predicates() {
        assert!(SessionState::Connected.is_connected());
        assert!(SessionState::Validated.is_connected());
        assert!(SessionState::Subscribed.is_connected());
        assert!(!SessionState::Idle.is_connected());
        assert!(!SessionState::Closed.is_connected());

        assert!(SessionState::Closed.is_closed());
        assert!(!SessionState::ShuttingDown.is_closed());
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "Idle");
        assert_eq!(SessionState::ShuttingDown.to_string(), "ShuttingDown");
    }

    #[test]
    fn test_default_state() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }
}
