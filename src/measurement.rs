//! Typed measurements and their wire decoders.
//!
//! The peripheral pushes fixed-layout little-endian records, one layout per
//! characteristic. [`MeasurementKind`] knows the byte width and decoding of
//! each layout; [`Measurement`] is the decoded value. Decoding is pure and
//! deterministic, and a length mismatch is always an error rather than a
//! silent truncation.

use bytes::Buf;

use crate::error::DecodeError;

/// A decoded sensor value received from the peripheral.
///
/// One variant exists per logical characteristic; the set is fixed at
/// compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Measurement {
    /// Three-axis accelerometer reading, in g.
    Acceleration {
        /// X-axis component.
        x: f32,
        /// Y-axis component.
        y: f32,
        /// Z-axis component.
        z: f32,
    },
    /// Three-axis gyroscope reading, in degrees per second.
    Rotation {
        /// X-axis component.
        x: f32,
        /// Y-axis component.
        y: f32,
        /// Z-axis component.
        z: f32,
    },
    /// Magnetometer heading.
    Magnetometer {
        /// Azimuth, in degrees.
        azimuth: i32,
    },
    /// Die temperature reading.
    Temperature {
        /// Temperature in degrees Celsius.
        celsius: f32,
    },
    /// Monotonic timestamp from the peripheral's clock (timing profile).
    Timestamp {
        /// Milliseconds since the peripheral booted.
        millis: u32,
    },
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acceleration { x, y, z } | Self::Rotation { x, y, z } => {
                write!(f, "(x: {:.2}, y: {:.2}, z: {:.2})", x, y, z)
            }
            Self::Magnetometer { azimuth } => write!(f, "(azimuth: {})", azimuth),
            Self::Temperature { celsius } => write!(f, "(temp: {:.4})", celsius),
            Self::Timestamp { millis } => write!(f, "(time: {})", millis),
        }
    }
}

/// The wire layout of a characteristic's notification payload.
///
/// Each kind maps to exactly one [`Measurement`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurementKind {
    /// Three packed little-endian `f32` values (12 bytes).
    Acceleration,
    /// Three packed little-endian `f32` values (12 bytes).
    Rotation,
    /// One little-endian `i32` (4 bytes).
    Magnetometer,
    /// One little-endian `f32` (4 bytes).
    Temperature,
    /// One little-endian `u32` (4 bytes).
    Timestamp,
}

impl MeasurementKind {
    /// The fixed payload width for this kind, in bytes.
    pub const fn expected_len(self) -> usize {
        match self {
            Self::Acceleration | Self::Rotation => 12,
            Self::Magnetometer | Self::Temperature | Self::Timestamp => 4,
        }
    }

    /// Decode a notification payload into a [`Measurement`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LengthMismatch`] if `data` is not exactly
    /// [`expected_len`](Self::expected_len) bytes long.
    pub fn decode(self, data: &[u8]) -> std::result::Result<Measurement, DecodeError> {
        let expected = self.expected_len();
        if data.len() != expected {
            return Err(DecodeError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut data = data;
        Ok(match self {
            Self::Acceleration => Measurement::Acceleration {
                x: data.get_f32_le(),
                y: data.get_f32_le(),
                z: data.get_f32_le(),
            },
            Self::Rotation => Measurement::Rotation {
                x: data.get_f32_le(),
                y: data.get_f32_le(),
                z: data.get_f32_le(),
            },
            Self::Magnetometer => Measurement::Magnetometer {
                azimuth: data.get_i32_le(),
            },
            Self::Temperature => Measurement::Temperature {
                celsius: data.get_f32_le(),
            },
            Self::Timestamp => Measurement::Timestamp {
                millis: data.get_u32_le(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    const ALL_KINDS: [MeasurementKind; 5] = [
        MeasurementKind::Acceleration,
        MeasurementKind::Rotation,
        MeasurementKind::Magnetometer,
        MeasurementKind::Temperature,
        MeasurementKind::Timestamp,
    ];

    fn encode_triple(x: f32, y: f32, z: f32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12);
        buf.put_f32_le(x);
        buf.put_f32_le(y);
        buf.put_f32_le(z);
        buf
    }

    #[test]
    fn test_decode_acceleration() {
        let data = encode_triple(1.0, 2.0, -1.0);
        let m = MeasurementKind::Acceleration.decode(&data).unwrap();
        assert_eq!(m, Measurement::Acceleration { x: 1.0, y: 2.0, z: -1.0 });
    }

    #[test]
    fn test_decode_rotation() {
        let data = encode_triple(0.5, -12.25, 360.0);
        let m = MeasurementKind::Rotation.decode(&data).unwrap();
        assert_eq!(m, Measurement::Rotation { x: 0.5, y: -12.25, z: 360.0 });
    }

    #[test]
    fn test_decode_magnetometer() {
        let data = (-90i32).to_le_bytes();
        let m = MeasurementKind::Magnetometer.decode(&data).unwrap();
        assert_eq!(m, Measurement::Magnetometer { azimuth: -90 });
    }

    #[test]
    fn test_decode_temperature() {
        let data = 21.5f32.to_le_bytes();
        let m = MeasurementKind::Temperature.decode(&data).unwrap();
        assert_eq!(m, Measurement::Temperature { celsius: 21.5 });
    }

    #[test]
    fn test_decode_timestamp() {
        let data = 123_456u32.to_le_bytes();
        let m = MeasurementKind::Timestamp.decode(&data).unwrap();
        assert_eq!(m, Measurement::Timestamp { millis: 123_456 });
    }

    #[test]
    fn test_length_mismatch_for_every_kind() {
        for kind in ALL_KINDS {
            let short = vec![0u8; kind.expected_len() - 1];
            assert_eq!(
                kind.decode(&short),
                Err(DecodeError::LengthMismatch {
                    expected: kind.expected_len(),
                    actual: kind.expected_len() - 1,
                }),
                "{:?} accepted a short buffer",
                kind
            );

            let long = vec![0u8; kind.expected_len() + 1];
            assert!(kind.decode(&long).is_err(), "{:?} accepted a long buffer", kind);
        }
    }

    #[test]
    fn test_empty_payload_rejected() {
        for kind in ALL_KINDS {
            assert!(kind.decode(&[]).is_err());
        }
    }

    #[test]
    fn test_display() {
        let m = Measurement::Acceleration { x: 1.0, y: 2.0, z: -1.0 };
        assert_eq!(m.to_string(), "(x: 1.00, y: 2.00, z: -1.00)");
        assert_eq!(Measurement::Magnetometer { azimuth: 42 }.to_string(), "(azimuth: 42)");
        assert_eq!(Measurement::Timestamp { millis: 7 }.to_string(), "(time: 7)");
    }

    proptest! {
        #[test]
        fn prop_wrong_length_always_fails(len in 0usize..64, kind_idx in 0usize..5) {
            let kind = ALL_KINDS[kind_idx];
            prop_assume!(len != kind.expected_len());
            let data = vec![0u8; len];
            prop_assert_eq!(
                kind.decode(&data),
                Err(DecodeError::LengthMismatch {
                    expected: kind.expected_len(),
                    actual: len,
                })
            );
        }

        #[test]
        fn prop_triple_roundtrip(x in -1e6f32..1e6, y in -1e6f32..1e6, z in -1e6f32..1e6) {
            let data = encode_triple(x, y, z);
            let m = MeasurementKind::Acceleration.decode(&data).unwrap();
            prop_assert_eq!(m, Measurement::Acceleration { x, y, z });
        }
    }
}
