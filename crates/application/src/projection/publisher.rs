use async_trait::async_trait;
use domain::{DomainEvent, EventPublisher};
use std::sync::Arc;

use super::{DevicesReadModel, KnownDevicesReadModel};

/// Feeds locally raised events straight into the read models
pub struct ProjectionPublisher {
    known_devices: Arc<KnownDevicesReadModel>,
    devices: Arc<DevicesReadModel>,
}

impl ProjectionPublisher {
    pub fn new(known_devices: Arc<KnownDevicesReadModel>, devices: Arc<DevicesReadModel>) -> Self {
        Self {
            known_devices,
            devices,
        }
    }
}

#[async_trait]
impl EventPublisher for ProjectionPublisher {
    async fn publish(
        &self,
        event: DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.known_devices.project(&event);
        self.devices.project(&event);
        Ok(())
    }
}
