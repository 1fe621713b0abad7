use chrono::Utc;
use domain::{BootNotification, BootResponse, DeviceStatuses, DomainEvent, EventPublisher};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::installation::InstallationService;
use crate::intervals::IntervalsService;
use crate::projection::KnownDevicesReadModel;

/// Entry point for protocol-neutral device traffic
pub struct CommunicationService {
    installations: Arc<InstallationService>,
    intervals: Arc<IntervalsService>,
    known_devices: Arc<KnownDevicesReadModel>,
    publisher: Arc<dyn EventPublisher>,
}

impl CommunicationService {
    pub fn new(
        installations: Arc<InstallationService>,
        intervals: Arc<IntervalsService>,
        known_devices: Arc<KnownDevicesReadModel>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            installations,
            intervals,
            known_devices,
            publisher,
        }
    }

    /// Record the boot and answer with server time, interval and registration status.
    ///
    /// Installation bookkeeping failures never fail the boot itself.
    pub async fn handle_boot(&self, boot: BootNotification) -> BootResponse {
        let device_id = boot.device_id.clone();

        match self.installations.handle_boot_notification(&boot).await {
            Ok(true) => debug!(device_id = %device_id, "Boot recorded on installation"),
            Ok(false) => {}
            Err(e) => warn!(device_id = %device_id, error = %e, "Failed to record boot on installation"),
        }

        let interval = self.intervals.calculate_interval(&boot).await;
        let state = self.known_devices.state(&device_id);

        if let Err(e) = self.publisher.publish(DomainEvent::boot_notified(boot)).await {
            error!(device_id = %device_id, error = %e, "Failed to publish boot notification");
        }

        let response = BootResponse {
            server_time: Utc::now(),
            interval,
            status: state.registration_status(),
        };
        info!(
            device_id = %device_id,
            state = state.as_str(),
            status = ?response.status,
            interval_secs = response.interval_seconds(),
            "🔌 Boot notification"
        );
        response
    }

    pub async fn handle_status(&self, statuses: DeviceStatuses) {
        let device_id = statuses.device_id.clone();
        debug!(device_id = %device_id, count = statuses.statuses.len(), "Statuses reported");

        if let Err(e) = self
            .publisher
            .publish(DomainEvent::statuses_reported(statuses))
            .await
        {
            error!(device_id = %device_id, error = %e, "Failed to publish statuses");
        }
    }
}
