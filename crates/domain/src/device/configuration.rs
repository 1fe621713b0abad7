use serde::{Deserialize, Serialize};

use super::{Location, OpeningHours, Ownership, Settings, Violations, Visibility};

/// Full snapshot of a device's configuration, including the derived
/// violations and visibility. Published on every device change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfiguration {
    pub device_id: String,
    pub ownership: Ownership,
    pub location: Option<Location>,
    pub opening_hours: OpeningHours,
    pub settings: Settings,
    pub violations: Violations,
    pub visibility: Visibility,
}

/// Persisted shape of a device. Derived values are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub device_id: String,
    pub ownership: Ownership,
    pub location: Option<Location>,
    pub opening_hours: OpeningHours,
    pub settings: Settings,
    pub version: u64,
}
