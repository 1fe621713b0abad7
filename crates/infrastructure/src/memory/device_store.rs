use async_trait::async_trait;
use domain::device::{Device, DeviceRecord, DeviceStore};
use domain::{Aggregate, DomainError, DomainEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{EventLogEntry, check_version};

#[derive(Default)]
struct Inner {
    devices: HashMap<String, DeviceRecord>,
    events: Vec<EventLogEntry>,
}

/// In-memory implementation of DeviceStore with an append-only event log
#[derive(Clone)]
pub struct InMemoryDeviceStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Event log of one device, oldest first
    pub async fn events(&self, device_id: &str) -> Vec<EventLogEntry> {
        let inner = self.inner.read().await;
        inner
            .events
            .iter()
            .filter(|entry| entry.aggregate_id == device_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get(&self, device_id: &str) -> Result<Option<Device>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.devices.get(device_id).cloned().map(Device::from_record))
    }

    async fn save(&self, device: &mut Device) -> Result<Vec<DomainEvent>, DomainError> {
        let mut inner = self.inner.write().await;
        let device_id = device.device_id().to_string();
        let stored = inner.devices.get(&device_id).map(|record| record.version);
        check_version(&device_id, device.version(), stored)?;

        let next = device.version() + 1;
        let mut record = device.to_record();
        record.version = next;
        inner.devices.insert(device_id.clone(), record);

        let events = device.committed(next);
        inner
            .events
            .extend(events.iter().map(|event| EventLogEntry::new(&device_id, event)));
        Ok(events)
    }

    async fn find_by_operator(&self, operator: &str) -> Result<Vec<Device>, DomainError> {
        let inner = self.inner.read().await;
        let mut devices: Vec<Device> = inner
            .devices
            .values()
            .filter(|record| record.ownership.operator.as_deref() == Some(operator))
            .cloned()
            .map(Device::from_record)
            .collect();
        devices.sort_by(|a, b| a.device_id().cmp(b.device_id()));
        Ok(devices)
    }
}
