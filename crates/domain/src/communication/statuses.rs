use serde::{Deserialize, Serialize};

/// Connector statuses reported by a device, in device order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatuses {
    pub device_id: String,
    pub statuses: Vec<String>,
}
