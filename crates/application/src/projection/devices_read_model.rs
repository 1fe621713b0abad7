use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domain::device::DeviceConfiguration;
use domain::{BootNotification, DeviceStatuses, DomainEvent};
use serde::Serialize;

/// Everything known about one device, merged from independent event streams
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetails {
    pub device_id: String,
    pub configuration: Option<DeviceConfiguration>,
    pub boot: Option<BootNotification>,
    pub statuses: Vec<String>,
}

#[derive(Debug, Default)]
struct Row {
    details: DeviceDetails,
    configured_at: Option<DateTime<Utc>>,
    booted_at: Option<DateTime<Utc>>,
    statuses_at: Option<DateTime<Utc>>,
}

/// Keeps a fact only when it is not older than the one already held
fn newer(held: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> bool {
    held.is_none_or(|held| incoming >= held)
}

/// One row per device. Each event type owns its own fields, so facts can
/// arrive in any order without clobbering each other.
#[derive(Debug, Default)]
pub struct DevicesReadModel {
    rows: DashMap<String, Row>,
}

impl DevicesReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self, event: &DomainEvent) {
        match event {
            DomainEvent::DeviceConfigured {
                configuration,
                timestamp,
            } => self.configured(configuration, *timestamp),
            DomainEvent::BootNotified { boot, timestamp } => self.booted(boot, *timestamp),
            DomainEvent::StatusesReported {
                statuses,
                timestamp,
            } => self.statuses(statuses, *timestamp),
            _ => {}
        }
    }

    pub fn query_details(&self, device_id: &str) -> Option<DeviceDetails> {
        self.rows.get(device_id).map(|row| row.details.clone())
    }

    /// Configured devices of one operator, ordered by device id
    pub fn query_by_operator(&self, operator: &str) -> Vec<DeviceDetails> {
        let mut devices: Vec<DeviceDetails> = self
            .rows
            .iter()
            .filter(|row| {
                row.details
                    .configuration
                    .as_ref()
                    .and_then(|c| c.ownership.operator.as_deref())
                    == Some(operator)
            })
            .map(|row| row.details.clone())
            .collect();
        devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        devices
    }

    fn configured(&self, configuration: &DeviceConfiguration, at: DateTime<Utc>) {
        let mut row = self.row(&configuration.device_id);
        if newer(row.configured_at, at) {
            row.details.configuration = Some(configuration.clone());
            row.configured_at = Some(at);
        }
    }

    fn booted(&self, boot: &BootNotification, at: DateTime<Utc>) {
        let mut row = self.row(&boot.device_id);
        if newer(row.booted_at, at) {
            row.details.boot = Some(boot.clone());
            row.booted_at = Some(at);
        }
    }

    fn statuses(&self, statuses: &DeviceStatuses, at: DateTime<Utc>) {
        let mut row = self.row(&statuses.device_id);
        if newer(row.statuses_at, at) {
            row.details.statuses = statuses.statuses.clone();
            row.statuses_at = Some(at);
        }
    }

    fn row(&self, device_id: &str) -> dashmap::mapref::one::RefMut<'_, String, Row> {
        self.rows.entry(device_id.to_string()).or_insert_with(|| Row {
            details: DeviceDetails {
                device_id: device_id.to_string(),
                ..Default::default()
            },
            ..Default::default()
        })
    }
}
