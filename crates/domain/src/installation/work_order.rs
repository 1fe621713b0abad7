use serde::{Deserialize, Serialize};

use crate::device::Ownership;

/// Sales order asking for a device to be installed for an operator/provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub order_id: String,
    pub ownership: Ownership,
}

impl WorkOrder {
    pub fn new(order_id: impl Into<String>, ownership: Ownership) -> Self {
        Self {
            order_id: order_id.into(),
            ownership,
        }
    }
}
