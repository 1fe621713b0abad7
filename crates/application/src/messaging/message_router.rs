use domain::installation::WorkOrder;
use domain::DomainError;
use infrastructure::messaging::messages::{InboundMessage, WorkOrderMessage};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::installation::InstallationService;
use crate::projection::KnownDevicesReadModel;

/// Dispatches inbound bus messages to the services consuming them.
///
/// Messages that can never succeed are logged and dropped. Only storage
/// failures surface, so the caller can leave the message unacknowledged
/// for redelivery.
pub struct MessageRouter {
    installations: Arc<InstallationService>,
    known_devices: Arc<KnownDevicesReadModel>,
}

impl MessageRouter {
    pub fn new(
        installations: Arc<InstallationService>,
        known_devices: Arc<KnownDevicesReadModel>,
    ) -> Self {
        Self {
            installations,
            known_devices,
        }
    }

    pub async fn handle(&self, topic: &str, payload: &[u8]) -> Result<(), DomainError> {
        let result = match InboundMessage::parse(topic, payload) {
            Ok(message) => self.dispatch(message).await,
            Err(e) => Err(e),
        };

        match result {
            Err(e) if is_retryable(&e) => Err(e),
            Err(e) => {
                warn!(topic = %topic, error = %e, "Dropping message");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn dispatch(&self, message: InboundMessage) -> Result<(), DomainError> {
        match message {
            InboundMessage::WorkOrder(order) => self.work_order(order).await,
            InboundMessage::Installation(message) => {
                self.known_devices.handle_installation(&message);
                Ok(())
            }
            InboundMessage::Device(message) => {
                self.known_devices.handle_device(&message);
                Ok(())
            }
            InboundMessage::Unrouted => {
                debug!("Ignoring message on unrouted topic");
                Ok(())
            }
        }
    }

    async fn work_order(&self, message: WorkOrderMessage) -> Result<(), DomainError> {
        let order = WorkOrder::try_from(message)?;
        self.installations.handle_work_order(order).await
    }
}

fn is_retryable(error: &DomainError) -> bool {
    matches!(
        error,
        DomainError::Repository(_) | DomainError::VersionConflict { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable(&DomainError::Repository("down".to_string())));
        assert!(is_retryable(&DomainError::VersionConflict {
            id: "k56gj".to_string(),
            expected: 1,
        }));
        assert!(!is_retryable(&DomainError::AlreadyExists("k56gj".to_string())));
        assert!(!is_retryable(&DomainError::MalformedMessage("bad".to_string())));
        assert!(!is_retryable(&DomainError::invalid_transition(
            "assign device",
            "COMPLETED"
        )));
    }
}
