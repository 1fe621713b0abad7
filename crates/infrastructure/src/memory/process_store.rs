use async_trait::async_trait;
use domain::installation::{
    InstallationProcess, InstallationProcessState, InstallationState, ProcessRecord, ProcessStore,
};
use domain::{Aggregate, DomainError, DomainEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{EventLogEntry, check_version};

#[derive(Default)]
struct Inner {
    processes: HashMap<String, ProcessRecord>,
    // Insertion order, used to pick the latest process of a device
    order: Vec<String>,
    events: Vec<EventLogEntry>,
}

/// In-memory implementation of ProcessStore using HashMap
#[derive(Clone)]
pub struct InMemoryProcessStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryProcessStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Event log of one order, oldest first
    pub async fn events(&self, order_id: &str) -> Vec<EventLogEntry> {
        let inner = self.inner.read().await;
        inner
            .events
            .iter()
            .filter(|entry| entry.aggregate_id == order_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryProcessStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessStore for InMemoryProcessStore {
    async fn save(
        &self,
        process: &mut InstallationProcess,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let mut inner = self.inner.write().await;
        let order_id = process.order_id().to_string();
        let stored = inner.processes.get(&order_id).map(|record| record.version);
        check_version(&order_id, process.version(), stored)?;

        let next = process.version() + 1;
        let mut record = process.to_record();
        record.version = next;

        if stored.is_none() {
            inner.order.push(order_id.clone());
        }
        inner.processes.insert(order_id.clone(), record);

        let events = process.committed(next);
        inner
            .events
            .extend(events.iter().map(|event| EventLogEntry::new(&order_id, event)));
        Ok(events)
    }

    async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<InstallationProcess>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .processes
            .get(order_id)
            .cloned()
            .map(InstallationProcess::from_record))
    }

    async fn get_by_device_id(
        &self,
        device_id: &str,
    ) -> Result<Option<InstallationProcess>, DomainError> {
        let inner = self.inner.read().await;
        let mut candidates: Vec<&ProcessRecord> = inner
            .order
            .iter()
            .rev()
            .filter_map(|order_id| inner.processes.get(order_id))
            .filter(|record| record.device_id.as_deref() == Some(device_id))
            .collect();

        // Open process first, then the most recent completed one
        candidates.sort_by_key(|record| record.completed);
        Ok(candidates
            .first()
            .map(|record| InstallationProcess::from_record((*record).clone())))
    }

    async fn find_by_states(
        &self,
        states: &[InstallationState],
    ) -> Result<Vec<InstallationProcessState>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|order_id| inner.processes.get(order_id))
            .filter(|record| states.is_empty() || states.contains(&record.state))
            .map(|record| InstallationProcessState {
                order_id: record.order_id.clone(),
                device_id: record.device_id.clone(),
                state: record.state,
            })
            .collect())
    }
}
