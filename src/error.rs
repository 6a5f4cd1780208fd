//! Error types for the nano-sense-ble crate.

use std::time::Duration;

use thiserror::Error;

use crate::session::SessionState;

/// The main error type for this crate.
///
/// Phase failures (discovery through subscription) are fatal to a running
/// session; per-packet decode problems travel separately as [`DecodeError`]
/// values handed to the measurement sink.
#[derive(Error, Debug)]
pub enum Error {
    /// Bluetooth-related error from the underlying BLE library.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Bluetooth is not available or is disabled on this system.
    #[error("Bluetooth not available or disabled")]
    BluetoothUnavailable,

    /// No peripheral advertising the target name appeared before the
    /// discovery timeout elapsed.
    #[error("no device named {name:?} found within {timeout:?}")]
    DiscoveryTimeout {
        /// The advertised name that was searched for.
        name: String,
        /// The discovery timeout that elapsed.
        timeout: Duration,
    },

    /// Failed to establish a connection to the discovered peripheral.
    #[error("connection failed: {reason}")]
    ConnectFailed {
        /// Description of why the connection failed.
        reason: String,
    },

    /// The connected peripheral does not expose a required characteristic.
    #[error("missing characteristic: {name}")]
    MissingCharacteristic {
        /// Logical name of the first missing characteristic.
        name: &'static str,
    },

    /// Subscribing to a characteristic's notifications failed.
    #[error("subscribe failed for {name}: {reason}")]
    SubscribeFailed {
        /// Logical name of the characteristic that could not be subscribed.
        name: &'static str,
        /// Description of the transport failure.
        reason: String,
    },

    /// A subscription for this characteristic is already active.
    #[error("already subscribed to {name}")]
    AlreadySubscribed {
        /// Logical name of the characteristic.
        name: &'static str,
    },

    /// A session operation was invoked from the wrong state.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the session was actually in.
        state: SessionState,
    },

    /// A notification payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure to decode a notification payload into a [`Measurement`].
///
/// These are surfaced per-event to the measurement sink and never terminate
/// the session.
///
/// [`Measurement`]: crate::measurement::Measurement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload length does not match the fixed width for this
    /// characteristic. Decoding never silently truncates or pads.
    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// The fixed byte width registered for the characteristic.
        expected: usize,
        /// The length of the payload actually received.
        actual: usize,
    },

    /// The logical name has no registered decoder.
    #[error("no decoder registered for {name:?}")]
    UnknownName {
        /// The unrecognized logical name.
        name: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
