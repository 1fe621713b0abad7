mod config_repository;
mod device_repository;
mod process_repository;

pub mod entities;

pub use config_repository::{INTERVAL_RULES_CONFIG, SeaOrmIntervalRulesRepository};
pub use device_repository::SeaOrmDeviceStore;
pub use process_repository::SeaOrmProcessStore;

use chrono::{DateTime, FixedOffset};
use domain::{DomainError, DomainEvent};
use sea_orm::DbErr;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Repository(format!("Database error: {}", e))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::Repository(format!("Serialization error: {}", e)))
}

pub(crate) fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Repository(format!("Corrupt stored value: {}", e)))
}

/// Event log columns `(id, type, time, payload)` for buffered events
pub(crate) fn event_models(
    events: &[DomainEvent],
) -> Result<Vec<(Uuid, String, DateTime<FixedOffset>, serde_json::Value)>, DomainError> {
    events
        .iter()
        .map(|event| {
            Ok((
                Uuid::new_v4(),
                event.event_type().to_string(),
                event.timestamp().fixed_offset(),
                to_json(event)?,
            ))
        })
        .collect()
}
