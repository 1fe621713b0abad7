//! In-memory stores, used when no database is configured and in tests.

mod device_store;
mod interval_rules;
mod process_store;

pub use device_store::InMemoryDeviceStore;
pub use interval_rules::InMemoryIntervalRulesRepository;
pub use process_store::InMemoryProcessStore;

use chrono::{DateTime, Utc};
use domain::{DomainError, DomainEvent};
use uuid::Uuid;

/// One row of an append-only event log
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub id: Uuid,
    pub aggregate_id: String,
    pub event_type: String,
    pub time: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventLogEntry {
    pub fn new(aggregate_id: &str, event: &DomainEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_id: aggregate_id.to_string(),
            event_type: event.event_type().to_string(),
            time: event.timestamp(),
            event: event.clone(),
        }
    }
}

/// Optimistic concurrency check shared by the stores.
///
/// `stored` is the persisted version, `None` when nothing is stored yet.
pub(crate) fn check_version(
    id: &str,
    expected: u64,
    stored: Option<u64>,
) -> Result<(), DomainError> {
    match stored {
        Some(_) if expected == 0 => Err(DomainError::AlreadyExists(id.to_string())),
        Some(current) if current == expected => Ok(()),
        None if expected == 0 => Ok(()),
        _ => Err(DomainError::VersionConflict {
            id: id.to_string(),
            expected,
        }),
    }
}
