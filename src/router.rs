//! Notification routing.
//!
//! Dispatches raw `(characteristic, bytes)` events to the right decoder and
//! forwards the decoded value to the caller's sink. Unknown identifiers are
//! dropped with a diagnostic; decode failures are handed to the sink as
//! values, so a single malformed packet never terminates the session.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DecodeError;
use crate::measurement::Measurement;
use crate::registry::Profile;

/// Callback receiving every decoded (or undecodable) notification.
pub type MeasurementSink =
    Box<dyn FnMut(&'static str, Result<Measurement, DecodeError>) + Send>;

/// Routes raw notification events through the registry to the sink.
///
/// Decoding is cheap and bounded, so the entry point never blocks for a
/// non-trivial duration.
pub struct NotificationRouter {
    /// Registry profile used to resolve identifiers.
    profile: Profile,
    /// Caller-supplied measurement consumer.
    sink: MeasurementSink,
}

impl NotificationRouter {
    /// Create a router forwarding to `sink`.
    pub fn new<F>(profile: Profile, sink: F) -> Self
    where
        F: FnMut(&'static str, Result<Measurement, DecodeError>) + Send + 'static,
    {
        Self {
            profile,
            sink: Box::new(sink),
        }
    }

    /// Handle one raw notification event.
    ///
    /// Resolves the identifier to a logical name, decodes the payload, and
    /// invokes the sink. Events from identifiers outside the profile are
    /// dropped.
    pub fn on_event(&mut self, characteristic: Uuid, data: &[u8]) {
        let Some(spec) = self.profile.resolve_uuid(characteristic) else {
            debug!(%characteristic, "dropping notification from unknown characteristic");
            return;
        };

        let result = spec.kind.decode(data);
        if let Err(e) = &result {
            warn!(name = spec.name, error = %e, "failed to decode notification");
        }

        (self.sink)(spec.name, result);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::ble::uuids::{ACCELERATION_UUID, TEMPERATURE_UUID};

    type Captured = Arc<Mutex<Vec<(&'static str, Result<Measurement, DecodeError>)>>>;

    fn capturing_router(profile: Profile) -> (NotificationRouter, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink_capture = captured.clone();
        let router = NotificationRouter::new(profile, move |name, result| {
            sink_capture.lock().push((name, result));
        });
        (router, captured)
    }

    #[test]
    fn test_routes_decoded_measurement() {
        let (mut router, captured) = capturing_router(Profile::Full);

        let mut data = Vec::new();
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(&(-1.0f32).to_le_bytes());
        router.on_event(ACCELERATION_UUID, &data);

        let events = captured.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "acceleration");
        assert_eq!(
            events[0].1,
            Ok(Measurement::Acceleration { x: 1.0, y: 2.0, z: -1.0 })
        );
    }

    #[test]
    fn test_unknown_identifier_dropped() {
        let (mut router, captured) = capturing_router(Profile::Full);

        router.on_event(Uuid::from_u128(0xdead_beef), &[0u8; 4]);

        assert!(captured.lock().is_empty());
    }

    #[test]
    fn test_decode_failure_surfaced_to_sink() {
        let (mut router, captured) = capturing_router(Profile::Full);

        router.on_event(TEMPERATURE_UUID, &[0u8; 3]);

        let events = captured.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "temperature");
        assert_eq!(
            events[0].1,
            Err(DecodeError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_timing_profile_resolves_elapsed_slot() {
        let (mut router, captured) = capturing_router(Profile::TimingOnly);

        router.on_event(crate::ble::uuids::ELAPSED_UUID, &500u32.to_le_bytes());

        let events = captured.lock();
        assert_eq!(events[0].0, "time");
        assert_eq!(events[0].1, Ok(Measurement::Timestamp { millis: 500 }));
    }
}
