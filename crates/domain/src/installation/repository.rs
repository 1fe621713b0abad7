use super::{InstallationProcess, InstallationProcessState, InstallationState};
use crate::{DomainError, DomainEvent};
use async_trait::async_trait;

/// Repository interface for installation processes
///
/// Implementations must compare the process version with the stored one and
/// fail with [`DomainError::VersionConflict`] on mismatch, or with
/// [`DomainError::AlreadyExists`] when a new process reuses an order id.
#[async_trait]
pub trait ProcessStore: Send + Sync {
    /// Persist the process and append its buffered events to the event log.
    /// Returns the drained events for publication.
    async fn save(
        &self,
        process: &mut InstallationProcess,
    ) -> Result<Vec<DomainEvent>, DomainError>;

    async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<InstallationProcess>, DomainError>;

    /// The open process for the device, or the latest completed one
    async fn get_by_device_id(
        &self,
        device_id: &str,
    ) -> Result<Option<InstallationProcess>, DomainError>;

    /// Processes in any of `states`; an empty slice matches every state
    async fn find_by_states(
        &self,
        states: &[InstallationState],
    ) -> Result<Vec<InstallationProcessState>, DomainError>;
}
