use serde::{Deserialize, Serialize};

/// Six independent switches controlling how a device behaves and is exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub auto_start: bool,
    pub remote_control: bool,
    pub billing: bool,
    pub reimbursement: bool,
    pub show_on_map: bool,
    pub public_access: bool,
}

/// Partial settings: only the flags that are present get applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_control: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reimbursement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_on_map: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_access: Option<bool>,
}

impl Settings {
    /// Field-wise merge; absent flags keep their current value.
    pub fn merge(self, update: &SettingsUpdate) -> Self {
        Self {
            auto_start: update.auto_start.unwrap_or(self.auto_start),
            remote_control: update.remote_control.unwrap_or(self.remote_control),
            billing: update.billing.unwrap_or(self.billing),
            reimbursement: update.reimbursement.unwrap_or(self.reimbursement),
            show_on_map: update.show_on_map.unwrap_or(self.show_on_map),
            public_access: update.public_access.unwrap_or(self.public_access),
        }
    }
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
