//! Characteristic registry.
//!
//! A static, process-wide mapping from logical measurement names to
//! characteristic UUIDs and their decoders. Registration order defines both
//! the validation and the subscription order. Two deployment profiles exist:
//! the full telemetry sketch and the timing-only sketch; the caller picks
//! one, nothing is auto-detected.

use uuid::Uuid;

use crate::ble::uuids::*;
use crate::error::DecodeError;
use crate::measurement::{Measurement, MeasurementKind};

/// One entry of the characteristic registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicSpec {
    /// Logical measurement name, unique within a profile.
    pub name: &'static str,
    /// 128-bit characteristic identifier.
    pub uuid: Uuid,
    /// Wire layout of the notification payload.
    pub kind: MeasurementKind,
}

const FULL_PROFILE: &[CharacteristicSpec] = &[
    CharacteristicSpec {
        name: "acceleration",
        uuid: ACCELERATION_UUID,
        kind: MeasurementKind::Acceleration,
    },
    CharacteristicSpec {
        name: "rotation",
        uuid: ROTATION_UUID,
        kind: MeasurementKind::Rotation,
    },
    CharacteristicSpec {
        name: "magnetometer",
        uuid: MAGNETOMETER_UUID,
        kind: MeasurementKind::Magnetometer,
    },
    CharacteristicSpec {
        name: "temperature",
        uuid: TEMPERATURE_UUID,
        kind: MeasurementKind::Temperature,
    },
];

const TIMING_PROFILE: &[CharacteristicSpec] = &[CharacteristicSpec {
    name: "time",
    uuid: ELAPSED_UUID,
    kind: MeasurementKind::Timestamp,
}];

/// The fixed characteristic set a session requires from the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Profile {
    /// Acceleration, rotation, magnetometer and temperature.
    #[default]
    Full,
    /// Single elapsed-time characteristic, for transmission timing runs.
    TimingOnly,
}

impl Profile {
    /// All characteristics of this profile, in registration order.
    ///
    /// Registration order drives validation and subscription order.
    pub fn characteristics(self) -> &'static [CharacteristicSpec] {
        match self {
            Self::Full => FULL_PROFILE,
            Self::TimingOnly => TIMING_PROFILE,
        }
    }

    /// Look up a characteristic by its logical name.
    pub fn resolve(self, name: &str) -> Option<&'static CharacteristicSpec> {
        self.characteristics().iter().find(|spec| spec.name == name)
    }

    /// Look up a characteristic by its 128-bit identifier.
    pub fn resolve_uuid(self, uuid: Uuid) -> Option<&'static CharacteristicSpec> {
        self.characteristics().iter().find(|spec| spec.uuid == uuid)
    }

    /// Decode a notification payload by logical name.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownName`] if `name` is not registered in
    /// this profile, or [`DecodeError::LengthMismatch`] if the payload width
    /// is wrong for the named characteristic.
    pub fn decode(
        self,
        name: &str,
        data: &[u8],
    ) -> std::result::Result<Measurement, DecodeError> {
        let spec = self.resolve(name).ok_or_else(|| DecodeError::UnknownName {
            name: name.to_string(),
        })?;
        spec.kind.decode(data)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::TimingOnly => write!(f, "timing-only"),
        }
    }
}
