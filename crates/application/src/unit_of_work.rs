//! Optimistic-concurrency unit of work.
//!
//! One call loads an aggregate, applies a single operation and saves it with
//! a version check. A `VersionConflict` repeats the whole read-modify-write
//! until the retry budget is spent. Buffered events are published only after
//! a successful save, in buffer order.

use async_trait::async_trait;
use domain::device::{Device, DeviceStore};
use domain::installation::{InstallationProcess, ProcessStore};
use domain::{Aggregate, DomainError, DomainEvent, EventPublisher};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Load/save pair the unit of work drives for one aggregate type
#[async_trait]
pub trait VersionedStore<A: Aggregate>: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<A>, DomainError>;

    async fn store(&self, aggregate: &mut A) -> Result<Vec<DomainEvent>, DomainError>;
}

#[async_trait]
impl VersionedStore<InstallationProcess> for dyn ProcessStore {
    async fn load(&self, order_id: &str) -> Result<Option<InstallationProcess>, DomainError> {
        self.get_by_order_id(order_id).await
    }

    async fn store(
        &self,
        process: &mut InstallationProcess,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        self.save(process).await
    }
}

#[async_trait]
impl VersionedStore<Device> for dyn DeviceStore {
    async fn load(&self, device_id: &str) -> Result<Option<Device>, DomainError> {
        self.get(device_id).await
    }

    async fn store(&self, device: &mut Device) -> Result<Vec<DomainEvent>, DomainError> {
        self.save(device).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// At least one attempt is always made
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

pub struct UnitOfWork {
    publisher: Arc<dyn EventPublisher>,
    retry: RetryPolicy,
}

impl UnitOfWork {
    pub fn new(publisher: Arc<dyn EventPublisher>, retry: RetryPolicy) -> Self {
        Self { publisher, retry }
    }

    /// Apply `operation` to an existing aggregate. A missing aggregate is `NotFound`.
    pub async fn execute<A, S, T, F>(
        &self,
        store: &S,
        id: &str,
        operation: F,
    ) -> Result<T, DomainError>
    where
        A: Aggregate,
        S: VersionedStore<A> + ?Sized,
        T: Send,
        F: FnMut(&mut A) -> Result<T, DomainError> + Send,
    {
        self.try_execute(store, id, operation)
            .await?
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    /// Like [`UnitOfWork::execute`] but a missing aggregate yields `Ok(None)`.
    pub async fn try_execute<A, S, T, F>(
        &self,
        store: &S,
        id: &str,
        mut operation: F,
    ) -> Result<Option<T>, DomainError>
    where
        A: Aggregate,
        S: VersionedStore<A> + ?Sized,
        T: Send,
        F: FnMut(&mut A) -> Result<T, DomainError> + Send,
    {
        let mut attempt = 1;
        loop {
            let Some(mut aggregate) = store.load(id).await? else {
                return Ok(None);
            };

            let output = operation(&mut aggregate)?;

            match store.store(&mut aggregate).await {
                Ok(events) => {
                    self.publish(events).await;
                    return Ok(Some(output));
                }
                Err(e) if e.is_conflict() && attempt < self.retry.max_attempts => {
                    warn!(
                        id = %id,
                        attempt = attempt,
                        "Version conflict, retrying against fresh state"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Persist a brand new aggregate, then publish its events
    pub async fn create<A, S>(&self, store: &S, aggregate: &mut A) -> Result<(), DomainError>
    where
        A: Aggregate,
        S: VersionedStore<A> + ?Sized,
    {
        let events = store.store(aggregate).await?;
        self.publish(events).await;
        Ok(())
    }

    async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let event_type = event.event_type().to_string();
            let aggregate_id = event.aggregate_id().to_string();
            match self.publisher.publish(event).await {
                Ok(()) => debug!(event_type = %event_type, id = %aggregate_id, "Event published"),
                // Still in the store's event log
                Err(e) => error!(
                    event_type = %event_type,
                    id = %aggregate_id,
                    "Failed to publish event: {}",
                    e
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::device::Ownership;
    use domain::installation::WorkOrder;
    use std::sync::Mutex;

    struct RecordingPublisher {
        events: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(
            &self,
            event: DomainEvent,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    /// Single-slot store that reports a conflict on the first `conflicts` saves
    struct FlakyStore {
        process: Mutex<Option<InstallationProcess>>,
        conflicts: Mutex<u32>,
        saves: Mutex<u32>,
    }

    impl FlakyStore {
        fn new(conflicts: u32) -> Self {
            let mut process = InstallationProcess::start(WorkOrder::new(
                "order-1",
                Ownership::new("Devicex.nl", "public-devices"),
            ));
            process.committed(1);
            Self {
                process: Mutex::new(Some(process)),
                conflicts: Mutex::new(conflicts),
                saves: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl VersionedStore<InstallationProcess> for FlakyStore {
        async fn load(&self, _id: &str) -> Result<Option<InstallationProcess>, DomainError> {
            Ok(self.process.lock().unwrap().clone())
        }

        async fn store(
            &self,
            process: &mut InstallationProcess,
        ) -> Result<Vec<DomainEvent>, DomainError> {
            *self.saves.lock().unwrap() += 1;
            let mut conflicts = self.conflicts.lock().unwrap();
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(DomainError::VersionConflict {
                    id: "order-1".to_string(),
                    expected: process.version(),
                });
            }
            let next = process.version() + 1;
            let events = process.committed(next);
            *self.process.lock().unwrap() = Some(process.clone());
            Ok(events)
        }
    }

    fn unit_of_work(max_attempts: u32) -> (UnitOfWork, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher {
            events: Mutex::new(Vec::new()),
        });
        (
            UnitOfWork::new(publisher.clone(), RetryPolicy::new(max_attempts)),
            publisher,
        )
    }

    #[tokio::test]
    async fn test_retries_conflict_then_publishes_once() {
        let (uow, publisher) = unit_of_work(3);
        let store = FlakyStore::new(1);

        uow.execute(&store, "order-1", |p: &mut InstallationProcess| {
            p.assign_device("D1")
        })
        .await
        .unwrap();

        assert_eq!(*store.saves.lock().unwrap(), 2);
        let published = publisher.events.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_type(), "DeviceAssigned");
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (uow, publisher) = unit_of_work(2);
        let store = FlakyStore::new(5);

        let result = uow
            .execute(&store, "order-1", |p: &mut InstallationProcess| {
                p.assign_device("D1")
            })
            .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(*store.saves.lock().unwrap(), 2);
        assert!(publisher.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guard_failure_is_not_retried() {
        let (uow, _) = unit_of_work(3);
        let store = FlakyStore::new(0);

        let result = uow
            .execute(&store, "order-1", |p: &mut InstallationProcess| {
                p.confirm_boot_data()
            })
            .await;

        assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
        assert_eq!(*store.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_aggregate() {
        let (uow, _) = unit_of_work(3);
        let store = FlakyStore::new(0);
        *store.process.lock().unwrap() = None;

        let found = uow
            .try_execute(&store, "order-1", |p: &mut InstallationProcess| {
                Ok(p.state())
            })
            .await
            .unwrap();
        assert!(found.is_none());

        let missing = uow
            .execute(&store, "order-1", |p: &mut InstallationProcess| {
                Ok(p.state())
            })
            .await;
        assert_eq!(missing, Err(DomainError::NotFound("order-1".to_string())));
    }

    #[test]
    fn test_retry_policy_has_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
        assert_eq!(RetryPolicy::default().max_attempts, 3);
    }
}
