use serde::{Deserialize, Serialize};

/// What the system knows about a device id that is talking to it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnownDeviceState {
    #[default]
    Unknown,
    InInstallation,
    Existing,
}

/// Registration answer returned to a booting device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Accepted,
    Pending,
    Rejected,
}

impl KnownDeviceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::InInstallation => "IN_INSTALLATION",
            Self::Existing => "EXISTING",
        }
    }

    pub fn registration_status(&self) -> RegistrationStatus {
        match self {
            Self::Existing => RegistrationStatus::Accepted,
            Self::InInstallation => RegistrationStatus::Pending,
            Self::Unknown => RegistrationStatus::Rejected,
        }
    }
}
