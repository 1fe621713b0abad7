use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::RegistrationStatus;

/// Device protocol family a notification arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    IoT16,
    IoT20,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IoT16 => "IoT16",
            Self::IoT20 => "IoT20",
        }
    }
}

/// Protocol-neutral boot notification sent by a device on (re)connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotification {
    pub device_id: String,
    pub protocol: Protocol,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

/// Identity a device reported while booting, kept on the installation process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootData {
    pub protocol: Protocol,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

impl From<&BootNotification> for BootData {
    fn from(boot: &BootNotification) -> Self {
        Self {
            protocol: boot.protocol,
            vendor: boot.vendor.clone(),
            model: boot.model.clone(),
            serial: boot.serial.clone(),
            firmware: boot.firmware.clone(),
        }
    }
}

/// Synchronous answer to a boot notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootResponse {
    pub server_time: DateTime<Utc>,
    pub interval: Duration,
    pub status: RegistrationStatus,
}

impl BootResponse {
    pub fn interval_seconds(&self) -> u64 {
        self.interval.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_data_from_notification() {
        let boot = BootNotification {
            device_id: "EVB-P4562137".to_string(),
            protocol: Protocol::IoT16,
            vendor: "Garo".to_string(),
            model: "CPF25 Family".to_string(),
            serial: "891234A56711".to_string(),
            firmware: "1.1".to_string(),
        };

        let data = BootData::from(&boot);

        assert_eq!(data.protocol, Protocol::IoT16);
        assert_eq!(data.vendor, "Garo");
        assert_eq!(data.firmware, "1.1");
    }

    #[test]
    fn test_protocol_serialization() {
        assert_eq!(
            serde_json::to_value(Protocol::IoT20).unwrap(),
            serde_json::json!("IoT20")
        );
        assert_eq!(Protocol::IoT16.as_str(), "IoT16");
    }
}
