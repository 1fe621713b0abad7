use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod publisher;
pub use publisher::EventPublisher;

use crate::communication::{BootNotification, DeviceStatuses};
use crate::device::DeviceConfiguration;

/// Domain events that can occur in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// Work order accepted, installation process created
    InstallationStarted {
        order_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Installer picked the device for the order
    DeviceAssigned {
        order_id: String,
        device_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Installation finished, device created
    InstallationCompleted {
        order_id: String,
        device_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Device configuration changed
    DeviceConfigured {
        configuration: DeviceConfiguration,
        timestamp: DateTime<Utc>,
    },

    /// Device booted
    BootNotified {
        boot: BootNotification,
        timestamp: DateTime<Utc>,
    },

    /// Device reported its connector statuses
    StatusesReported {
        statuses: DeviceStatuses,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Create an InstallationStarted event
    pub fn installation_started(order_id: impl Into<String>) -> Self {
        Self::InstallationStarted {
            order_id: order_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a DeviceAssigned event
    pub fn device_assigned(order_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self::DeviceAssigned {
            order_id: order_id.into(),
            device_id: device_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an InstallationCompleted event
    pub fn installation_completed(
        order_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self::InstallationCompleted {
            order_id: order_id.into(),
            device_id: device_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a DeviceConfigured event
    pub fn device_configured(configuration: DeviceConfiguration) -> Self {
        Self::DeviceConfigured {
            configuration,
            timestamp: Utc::now(),
        }
    }

    /// Create a BootNotified event
    pub fn boot_notified(boot: BootNotification) -> Self {
        Self::BootNotified {
            boot,
            timestamp: Utc::now(),
        }
    }

    /// Create a StatusesReported event
    pub fn statuses_reported(statuses: DeviceStatuses) -> Self {
        Self::StatusesReported {
            statuses,
            timestamp: Utc::now(),
        }
    }

    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::InstallationStarted { timestamp, .. } => *timestamp,
            Self::DeviceAssigned { timestamp, .. } => *timestamp,
            Self::InstallationCompleted { timestamp, .. } => *timestamp,
            Self::DeviceConfigured { timestamp, .. } => *timestamp,
            Self::BootNotified { timestamp, .. } => *timestamp,
            Self::StatusesReported { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &str {
        match self {
            Self::InstallationStarted { .. } => "InstallationStarted",
            Self::DeviceAssigned { .. } => "DeviceAssigned",
            Self::InstallationCompleted { .. } => "InstallationCompleted",
            Self::DeviceConfigured { .. } => "DeviceConfigured",
            Self::BootNotified { .. } => "BootNotified",
            Self::StatusesReported { .. } => "StatusesReported",
        }
    }

    /// Id of the aggregate (order or device) the event belongs to
    pub fn aggregate_id(&self) -> &str {
        match self {
            Self::InstallationStarted { order_id, .. } => order_id,
            Self::DeviceAssigned { order_id, .. } => order_id,
            Self::InstallationCompleted { order_id, .. } => order_id,
            Self::DeviceConfigured { configuration, .. } => &configuration.device_id,
            Self::BootNotified { boot, .. } => &boot.device_id,
            Self::StatusesReported { statuses, .. } => &statuses.device_id,
        }
    }
}
