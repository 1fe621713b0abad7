use dashmap::DashMap;
use domain::device::Ownership;
use domain::{DomainEvent, KnownDeviceState};
use infrastructure::messaging::messages::{DeviceMessage, InstallationMessage};
use tracing::debug;

/// Installation standing of every device id seen on the bus.
///
/// Each fact overwrites the previous state, so re-delivering the latest
/// fact is harmless. Facts carry no ordering: a stale `DeviceAssigned`
/// arriving after `InstallationCompleted` moves the device back to
/// `InInstallation` until the next fact for it.
#[derive(Debug, Default)]
pub struct KnownDevicesReadModel {
    states: DashMap<String, KnownDeviceState>,
}

impl KnownDevicesReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids never seen are `Unknown`
    pub fn state(&self, device_id: &str) -> KnownDeviceState {
        self.states
            .get(device_id)
            .map(|state| *state)
            .unwrap_or_default()
    }

    pub fn handle_installation(&self, message: &InstallationMessage) {
        match message {
            InstallationMessage::DeviceAssigned { device_id, .. } => {
                self.set(device_id, KnownDeviceState::InInstallation)
            }
            InstallationMessage::InstallationCompleted { device_id, .. } => {
                self.set(device_id, KnownDeviceState::Existing)
            }
            InstallationMessage::InstallationStarted { .. } | InstallationMessage::NotInterested => {}
        }
    }

    pub fn handle_device(&self, message: &DeviceMessage) {
        if let DeviceMessage::DeviceConfiguration {
            device_id,
            ownership,
        } = message
        {
            let unowned = ownership.as_ref().is_none_or(Ownership::is_unowned);
            self.configured(device_id, unowned);
        }
    }

    /// Same transitions for events raised in this process
    pub fn project(&self, event: &DomainEvent) {
        match event {
            DomainEvent::DeviceAssigned { device_id, .. } => {
                self.set(device_id, KnownDeviceState::InInstallation)
            }
            DomainEvent::InstallationCompleted { device_id, .. } => {
                self.set(device_id, KnownDeviceState::Existing)
            }
            DomainEvent::DeviceConfigured { configuration, .. } => self.configured(
                &configuration.device_id,
                configuration.ownership.is_unowned(),
            ),
            _ => {}
        }
    }

    fn configured(&self, device_id: &str, unowned: bool) {
        if unowned {
            self.set(device_id, KnownDeviceState::Unknown);
        }
    }

    fn set(&self, device_id: &str, state: KnownDeviceState) {
        debug!(device_id = %device_id, state = state.as_str(), "Known device state");
        self.states.insert(device_id.to_string(), state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration(device_id: &str, ownership: Option<Ownership>) -> DeviceMessage {
        DeviceMessage::DeviceConfiguration {
            device_id: device_id.to_string(),
            ownership,
        }
    }

    fn assigned(device_id: &str) -> InstallationMessage {
        InstallationMessage::DeviceAssigned {
            order_id: "k56gj".to_string(),
            device_id: device_id.to_string(),
        }
    }

    fn completed(device_id: &str) -> InstallationMessage {
        InstallationMessage::InstallationCompleted {
            order_id: "k56gj".to_string(),
            device_id: device_id.to_string(),
        }
    }

    #[test]
    fn test_unknown_by_default() {
        let model = KnownDevicesReadModel::new();
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Unknown);
    }

    #[test]
    fn test_installation_lifecycle() {
        let model = KnownDevicesReadModel::new();

        model.handle_installation(&assigned("EVB-P4562137"));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::InInstallation);

        model.handle_installation(&completed("EVB-P4562137"));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Existing);

        // re-delivery
        model.handle_installation(&completed("EVB-P4562137"));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Existing);
    }

    #[test]
    fn test_unowned_configuration_resets_to_unknown() {
        let model = KnownDevicesReadModel::new();
        model.handle_installation(&completed("EVB-P4562137"));

        model.handle_device(&configuration(
            "EVB-P4562137",
            Some(Ownership::new("Devicex.nl", "public-devices")),
        ));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Existing);

        model.handle_device(&configuration("EVB-P4562137", Some(Ownership::unowned())));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Unknown);
    }

    #[test]
    fn test_missing_ownership_counts_as_unowned() {
        let model = KnownDevicesReadModel::new();
        model.handle_installation(&completed("EVB-P4562137"));

        model.handle_device(&configuration("EVB-P4562137", None));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Unknown);
    }

    #[test]
    fn test_stale_assignment_overwrites_completion() {
        let model = KnownDevicesReadModel::new();
        model.handle_installation(&completed("EVB-P4562137"));

        model.handle_installation(&assigned("EVB-P4562137"));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::InInstallation);
    }

    #[test]
    fn test_project_domain_events() {
        let model = KnownDevicesReadModel::new();

        model.project(&DomainEvent::device_assigned("k56gj", "EVB-P4562137"));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::InInstallation);

        model.project(&DomainEvent::installation_started("other"));
        model.project(&DomainEvent::installation_completed("k56gj", "EVB-P4562137"));
        assert_eq!(model.state("EVB-P4562137"), KnownDeviceState::Existing);
    }

    #[test]
    fn test_not_interested_is_ignored() {
        let model = KnownDevicesReadModel::new();
        model.handle_installation(&InstallationMessage::NotInterested);
        model.handle_device(&DeviceMessage::NotInterested);
        assert!(model.states.is_empty());
    }
}
