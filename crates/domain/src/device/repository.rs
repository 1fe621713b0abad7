use super::Device;
use crate::{DomainError, DomainEvent};
use async_trait::async_trait;

/// Repository interface for device persistence
///
/// `save` is a version-checked upsert: a new device (version 0) must not
/// exist yet, an existing one must still be at the loaded version. On success
/// the buffered events are appended to the device's event log and returned
/// for publication.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn get(&self, device_id: &str) -> Result<Option<Device>, DomainError>;

    async fn save(&self, device: &mut Device) -> Result<Vec<DomainEvent>, DomainError>;

    /// Devices run by the given operator, ordered by id
    async fn find_by_operator(&self, operator: &str) -> Result<Vec<Device>, DomainError>;
}
