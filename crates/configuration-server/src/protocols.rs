//! Device protocol payloads and their translation to protocol-neutral facts.

use chrono::{DateTime, SecondsFormat, Utc};
use domain::communication::{Protocol, RegistrationStatus};
use domain::{BootNotification, BootResponse, DeviceStatuses};
use serde::{Deserialize, Serialize};

pub mod iot16 {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BootNotificationRequest {
        pub charge_point_vendor: String,
        pub charge_point_model: String,
        #[serde(default)]
        pub charge_point_serial_number: Option<String>,
        #[serde(default)]
        pub charge_box_serial_number: Option<String>,
        #[serde(default)]
        pub firmware_version: Option<String>,
    }

    impl BootNotificationRequest {
        pub fn to_boot(self, device_id: &str) -> BootNotification {
            BootNotification {
                device_id: device_id.to_string(),
                protocol: Protocol::IoT16,
                vendor: self.charge_point_vendor,
                model: self.charge_point_model,
                serial: self
                    .charge_box_serial_number
                    .or(self.charge_point_serial_number)
                    .unwrap_or_default(),
                firmware: self.firmware_version.unwrap_or_default(),
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct StatusNotificationRequest {
        pub statuses: Vec<String>,
    }

    impl StatusNotificationRequest {
        pub fn to_statuses(self, device_id: &str) -> DeviceStatuses {
            DeviceStatuses {
                device_id: device_id.to_string(),
                statuses: self.statuses,
            }
        }
    }
}

pub mod iot20 {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ChargingStation {
        pub vendor_name: String,
        pub model: String,
        #[serde(default)]
        pub serial_number: Option<String>,
        #[serde(default)]
        pub firmware_version: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BootNotificationRequest {
        pub charging_station: ChargingStation,
        #[serde(default)]
        pub reason: Option<String>,
    }

    impl BootNotificationRequest {
        pub fn to_boot(self, device_id: &str) -> BootNotification {
            let station = self.charging_station;
            BootNotification {
                device_id: device_id.to_string(),
                protocol: Protocol::IoT20,
                vendor: station.vendor_name,
                model: station.model,
                serial: station.serial_number.unwrap_or_default(),
                firmware: station.firmware_version.unwrap_or_default(),
            }
        }
    }

    // Same shape as the 1.6 request
    pub use super::iot16::StatusNotificationRequest;
}

/// Answer to a boot notification, shared by both protocol versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationResponse {
    pub current_time: String,
    pub interval: u64,
    pub status: RegistrationStatus,
}

impl From<BootResponse> for BootNotificationResponse {
    fn from(response: BootResponse) -> Self {
        Self {
            current_time: format_time(response.server_time),
            interval: response.interval_seconds(),
            status: response.status,
        }
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_iot16_boot() {
        let request: iot16::BootNotificationRequest = serde_json::from_value(json!({
            "chargePointVendor": "Garo",
            "chargePointModel": "CPF25 Family",
            "chargeBoxSerialNumber": "891234A56711",
            "firmwareVersion": "1.1"
        }))
        .unwrap();

        let boot = request.to_boot("EVB-P4562137");

        assert_eq!(boot.protocol, Protocol::IoT16);
        assert_eq!(boot.vendor, "Garo");
        assert_eq!(boot.serial, "891234A56711");
        assert_eq!(boot.firmware, "1.1");
    }

    #[test]
    fn test_iot20_boot() {
        let request: iot20::BootNotificationRequest = serde_json::from_value(json!({
            "reason": "PowerUp",
            "chargingStation": {
                "vendorName": "Alfen BV",
                "model": "NG920-5250",
                "serialNumber": "ACE0000000",
                "firmwareVersion": "4.5.2"
            }
        }))
        .unwrap();

        let boot = request.to_boot("ALF-9571445");

        assert_eq!(boot.protocol, Protocol::IoT20);
        assert_eq!(boot.device_id, "ALF-9571445");
        assert_eq!(boot.model, "NG920-5250");
    }

    #[test]
    fn test_missing_optional_fields() {
        let request: iot16::BootNotificationRequest = serde_json::from_value(json!({
            "chargePointVendor": "Garo",
            "chargePointModel": "CPF25 Family"
        }))
        .unwrap();

        let boot = request.to_boot("EVB-P4562137");

        assert_eq!(boot.serial, "");
        assert_eq!(boot.firmware, "");
    }

    #[test]
    fn test_boot_response_format() {
        let server_time = DateTime::parse_from_rfc3339("2024-03-01T10:15:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let response = BootNotificationResponse::from(BootResponse {
            server_time,
            interval: Duration::from_secs(1800),
            status: RegistrationStatus::Pending,
        });

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "currentTime": "2024-03-01T10:15:30.000Z",
                "interval": 1800,
                "status": "Pending"
            })
        );
    }
}
