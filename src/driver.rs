//! Session driver.
//!
//! Orchestrates the full phase sequence (discover, connect, validate,
//! subscribe) and owns the run-until-cancelled loop. Transport
//! notifications, link loss, and operator cancellation all arrive as
//! messages on a single event channel, so teardown is ordered with respect
//! to in-flight notifications and both cancellation causes share one code
//! path.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ble::transport::Transport;
use crate::ble::uuids::DEFAULT_DEVICE_NAME;
use crate::error::{DecodeError, Result};
use crate::measurement::Measurement;
use crate::registry::Profile;
use crate::router::NotificationRouter;
use crate::session::{DeviceSession, SessionState};

/// Configuration for a single session run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Advertised name the peripheral must match exactly.
    pub target_name: String,
    /// Characteristic set to validate and subscribe.
    pub profile: Profile,
    /// How long discovery may wait for a matching advertisement.
    pub discovery_timeout: Duration,
}

impl SessionConfig {
    /// Default discovery timeout.
    pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a configuration for the given profile with the default
    /// target name and discovery timeout.
    pub fn new(profile: Profile) -> Self {
        Self {
            target_name: DEFAULT_DEVICE_NAME.to_string(),
            profile,
            discovery_timeout: Self::DEFAULT_DISCOVERY_TIMEOUT,
        }
    }

    /// Override the target device name.
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = name.into();
        self
    }

    /// Override the discovery timeout.
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(Profile::Full)
    }
}

/// A message on the driver's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A raw notification from the transport.
    Notification {
        /// UUID of the characteristic that sent the notification.
        characteristic: Uuid,
        /// The notification payload.
        data: Vec<u8>,
    },
    /// The transport's notification stream ended unexpectedly.
    LinkLost,
    /// Operator-requested cancellation.
    Shutdown,
}

/// Handle for requesting a graceful shutdown of a running driver.
///
/// Cheap to clone; typically wired to a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ShutdownHandle {
    /// Ask the driver to leave its streaming loop and tear down.
    ///
    /// Safe to call more than once; teardown still runs exactly once.
    pub fn request_shutdown(&self) {
        if self.tx.send(SessionEvent::Shutdown).is_err() {
            debug!("shutdown requested but the session already ended");
        }
    }
}

/// Drives one [`DeviceSession`] from discovery to teardown.
pub struct SessionDriver {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    session: DeviceSession,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionDriver {
    /// Create a driver over a transport.
    pub fn new(transport: Arc<dyn Transport>, config: SessionConfig) -> Self {
        // Unbounded so a cancellation message can never be dropped behind a
        // full buffer of notifications.
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = DeviceSession::new(transport.clone(), config.profile);

        Self {
            config,
            transport,
            session,
            events_tx,
            events_rx,
        }
    }

    /// Current state of the underlying session.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Obtain a shutdown handle for this driver.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.events_tx.clone(),
        }
    }

    /// Run the session to completion.
    ///
    /// Executes discovery, connection, validation, and subscription in
    /// order, then blocks streaming decoded measurements into `sink` until
    /// a shutdown is requested or the transport loses the link; both end in
    /// the same unsubscribe-then-disconnect teardown. Consuming `self`
    /// makes a second run of a closed session impossible.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first phase that did not complete. The
    /// session is left `Closed` either way.
    pub async fn run<F>(mut self, sink: F) -> Result<()>
    where
        F: FnMut(&'static str, std::result::Result<Measurement, DecodeError>) + Send + 'static,
    {
        let mut router = NotificationRouter::new(self.config.profile, sink);

        if let Err(e) = self.bring_up().await {
            self.session.teardown().await;
            return Err(e);
        }

        let notifications = match self.transport.notifications().await {
            Ok(stream) => stream,
            Err(e) => {
                self.session.teardown().await;
                return Err(e);
            }
        };

        // Pump transport notifications onto the event channel. Stream end
        // means the transport lost the link while subscribed, which must be
        // handled exactly like an operator cancellation.
        let tx = self.events_tx.clone();
        let pump = tokio::spawn(async move {
            let mut notifications = notifications;
            while let Some(n) = notifications.next().await {
                let event = SessionEvent::Notification {
                    characteristic: n.characteristic,
                    data: n.data,
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
            let _ = tx.send(SessionEvent::LinkLost);
        });

        info!("listening for notifications");

        while let Some(event) = self.events_rx.recv().await {
            match event {
                SessionEvent::Notification {
                    characteristic,
                    data,
                } => router.on_event(characteristic, &data),
                SessionEvent::Shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                SessionEvent::LinkLost => {
                    warn!("transport link lost, shutting down");
                    break;
                }
            }
        }

        pump.abort();
        self.session.request_shutdown();
        self.session.teardown().await;

        Ok(())
    }

    async fn bring_up(&mut self) -> Result<()> {
        self.session
            .discover(&self.config.target_name, self.config.discovery_timeout)
            .await?;
        self.session.connect().await?;
        self.session.validate().await?;
        self.session.subscribe_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.target_name, DEFAULT_DEVICE_NAME);
        assert_eq!(config.profile, Profile::Full);
        assert_eq!(
            config.discovery_timeout,
            SessionConfig::DEFAULT_DISCOVERY_TIMEOUT
        );
    }

    #[test]
    fn test_config_overrides() {
        let config = SessionConfig::new(Profile::TimingOnly)
            .with_target_name("OtherDevice")
            .with_discovery_timeout(Duration::from_millis(250));
        assert_eq!(config.target_name, "OtherDevice");
        assert_eq!(config.profile, Profile::TimingOnly);
        assert_eq!(config.discovery_timeout, Duration::from_millis(250));
    }
}
