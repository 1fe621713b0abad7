use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Installation process state, derived from the populated process fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallationState {
    /// No device assigned yet
    Pending,
    /// Device assigned, waiting for it to boot
    DeviceAssigned,
    /// Device booted, boot data may or may not be confirmed
    Booted,
    /// Terminal, the device has been created
    Completed,
}

impl InstallationState {
    pub const ALL: [InstallationState; 4] = [
        Self::Pending,
        Self::DeviceAssigned,
        Self::Booted,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::DeviceAssigned => "DEVICE_ASSIGNED",
            Self::Booted => "BOOTED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallationState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::MalformedMessage(format!("Unknown installation state: {s}")))
    }
}

/// Read view of a process: who is installing what, and how far along
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationProcessState {
    pub order_id: String,
    pub device_id: Option<String>,
    pub state: InstallationState,
}
