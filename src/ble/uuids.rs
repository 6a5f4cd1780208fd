//! BLE Service and Characteristic UUIDs.
//!
//! Contains all UUID constants used for communicating with the Nano Sense
//! peripheral sketch.

use uuid::Uuid;

/// Advertised local name of the peripheral.
pub const DEFAULT_DEVICE_NAME: &str = "MonArduinoBLE";

/// Telemetry service UUID advertised by the sketch.
pub const TELEMETRY_SERVICE_UUID: Uuid = Uuid::from_u128(0x19b1_0000_e8f2_537e_4f6c_d104768a1214);

/// Accelerometer characteristic UUID (Notify, three packed `f32`).
pub const ACCELERATION_UUID: Uuid = Uuid::from_u128(0x19b1_0001_e8f2_537e_4f6c_d104768a1214);
/// Gyroscope characteristic UUID (Notify, three packed `f32`).
pub const ROTATION_UUID: Uuid = Uuid::from_u128(0x19b1_0002_e8f2_537e_4f6c_d104768a1215);
/// Magnetometer characteristic UUID (Notify, one `i32`).
pub const MAGNETOMETER_UUID: Uuid = Uuid::from_u128(0x19b1_0002_e8f2_537e_4f6c_d104768a1216);
/// Temperature characteristic UUID (Notify, one `f32`).
pub const TEMPERATURE_UUID: Uuid = Uuid::from_u128(0x19b1_0003_e8f2_537e_4f6c_d104768a1217);

/// Elapsed-time characteristic UUID used by the timing sketch (Notify, one
/// `u32`). The timing sketch reuses the accelerometer slot.
pub const ELAPSED_UUID: Uuid = ACCELERATION_UUID;

/// Check if a service UUID belongs to the telemetry sketch.
pub fn is_telemetry_service(uuid: &Uuid) -> bool {
    *uuid == TELEMETRY_SERVICE_UUID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        let service = TELEMETRY_SERVICE_UUID.to_string();
        assert_eq!(service, "19b10000-e8f2-537e-4f6c-d104768a1214");

        let acceleration = ACCELERATION_UUID.to_string();
        assert_eq!(acceleration, "19b10001-e8f2-537e-4f6c-d104768a1214");
    }

    #[test]
    fn test_is_telemetry_service() {
        assert!(is_telemetry_service(&TELEMETRY_SERVICE_UUID));
        assert!(!is_telemetry_service(&ACCELERATION_UUID));
    }

    #[test]
    fn test_rotation_and_magnetometer_differ() {
        // The sketch gives these two the same short id but distinct suffixes.
        assert_ne!(ROTATION_UUID, MAGNETOMETER_UUID);
    }
}
