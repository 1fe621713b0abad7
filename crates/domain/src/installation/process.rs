use serde::{Deserialize, Serialize};

use super::{InstallationProcessState, InstallationState, WorkOrder};
use crate::aggregate::Aggregate;
use crate::communication::{BootData, BootNotification};
use crate::device::{Location, Ownership};
use crate::{DomainError, DomainEvent};

/// Outcome of a completed installation, used to create the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub confirmed: bool,
    pub ownership: Ownership,
    pub location: Option<Location>,
    pub device_id: String,
}

/// Persisted shape of an installation process.
///
/// `state` is written for querying only and ignored when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub order_id: String,
    pub device_id: Option<String>,
    pub ownership: Ownership,
    pub location: Option<Location>,
    pub boot: Option<BootData>,
    pub confirmed: bool,
    pub completed: bool,
    pub state: InstallationState,
    pub version: u64,
}

/// Installation process aggregate.
///
/// Walks `PENDING -> DEVICE_ASSIGNED -> BOOTED -> COMPLETED`. The state is
/// never stored on the aggregate, it is derived from which fields are set.
#[derive(Debug, Clone)]
pub struct InstallationProcess {
    order_id: String,
    device_id: Option<String>,
    ownership: Ownership,
    location: Option<Location>,
    boot: Option<BootData>,
    confirmed: bool,
    completed: bool,
    version: u64,
    events: Vec<DomainEvent>,
}

impl InstallationProcess {
    /// Start a new installation for a work order
    pub fn start(order: WorkOrder) -> Self {
        let events = vec![DomainEvent::installation_started(order.order_id.clone())];
        Self {
            order_id: order.order_id,
            device_id: None,
            ownership: order.ownership,
            location: None,
            boot: None,
            confirmed: false,
            completed: false,
            version: 0,
            events,
        }
    }

    /// Rebuild from storage; no events are buffered.
    pub fn from_record(record: ProcessRecord) -> Self {
        Self {
            order_id: record.order_id,
            device_id: record.device_id,
            ownership: record.ownership,
            location: record.location,
            boot: record.boot,
            confirmed: record.confirmed,
            completed: record.completed,
            version: record.version,
            events: Vec::new(),
        }
    }

    pub fn to_record(&self) -> ProcessRecord {
        ProcessRecord {
            order_id: self.order_id.clone(),
            device_id: self.device_id.clone(),
            ownership: self.ownership.clone(),
            location: self.location.clone(),
            boot: self.boot.clone(),
            confirmed: self.confirmed,
            completed: self.completed,
            state: self.state(),
            version: self.version,
        }
    }

    // Getters
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn boot(&self) -> Option<&BootData> {
        self.boot.as_ref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn state(&self) -> InstallationState {
        if self.completed {
            InstallationState::Completed
        } else if self.device_id.is_none() {
            InstallationState::Pending
        } else if self.boot.is_none() {
            InstallationState::DeviceAssigned
        } else {
            InstallationState::Booted
        }
    }

    pub fn view(&self) -> InstallationProcessState {
        InstallationProcessState {
            order_id: self.order_id.clone(),
            device_id: self.device_id.clone(),
            state: self.state(),
        }
    }

    /// Assign (or re-assign) the device to install. Not possible once it booted.
    pub fn assign_device(&mut self, device_id: impl Into<String>) -> Result<(), DomainError> {
        let device_id = device_id.into();
        if device_id.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "Device id must not be blank".to_string(),
            ));
        }

        match self.state() {
            InstallationState::Pending | InstallationState::DeviceAssigned => {}
            state => return Err(DomainError::invalid_transition("assign device", state)),
        }

        self.device_id = Some(device_id.clone());
        self.events
            .push(DomainEvent::device_assigned(self.order_id.clone(), device_id));
        Ok(())
    }

    pub fn assign_location(&mut self, location: Location) -> Result<(), DomainError> {
        self.ensure_not_completed("assign location")?;
        self.location = Some(location);
        Ok(())
    }

    /// Record boot data if the notification comes from the assigned device.
    ///
    /// Returns whether the notification was applied. The last boot wins.
    pub fn handle_boot_notification(&mut self, boot: &BootNotification) -> bool {
        if self.completed || self.device_id.as_deref() != Some(boot.device_id.as_str()) {
            return false;
        }
        self.boot = Some(BootData::from(boot));
        true
    }

    pub fn confirm_boot_data(&mut self) -> Result<(), DomainError> {
        self.ensure_not_completed("confirm boot data")?;
        if self.boot.is_none() {
            return Err(DomainError::invalid_transition(
                "confirm boot data",
                self.state(),
            ));
        }
        self.confirmed = true;
        Ok(())
    }

    /// Finish the installation. Calling it again returns the same result
    /// without buffering another event.
    pub fn complete(&mut self) -> Result<CompletionResult, DomainError> {
        if self.completed {
            return self.completion_result();
        }
        if !self.confirmed {
            return Err(DomainError::invalid_transition("complete", self.state()));
        }

        let result = self.completion_result()?;
        self.completed = true;
        self.events.push(DomainEvent::installation_completed(
            self.order_id.clone(),
            result.device_id.clone(),
        ));
        Ok(result)
    }

    fn completion_result(&self) -> Result<CompletionResult, DomainError> {
        let device_id = self
            .device_id
            .clone()
            .ok_or_else(|| DomainError::invalid_transition("complete", self.state()))?;
        Ok(CompletionResult {
            confirmed: self.confirmed,
            ownership: self.ownership.clone(),
            location: self.location.clone(),
            device_id,
        })
    }

    fn ensure_not_completed(&self, operation: &'static str) -> Result<(), DomainError> {
        if self.completed {
            return Err(DomainError::invalid_transition(
                operation,
                InstallationState::Completed,
            ));
        }
        Ok(())
    }
}

impl Aggregate for InstallationProcess {
    fn aggregate_id(&self) -> &str {
        &self.order_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    fn committed(&mut self, version: u64) -> Vec<DomainEvent> {
        self.version = version;
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::Protocol;

    fn order() -> WorkOrder {
        WorkOrder::new("order-1", Ownership::new("Devicex.nl", "public-devices"))
    }

    fn boot(device_id: &str) -> BootNotification {
        BootNotification {
            device_id: device_id.to_string(),
            protocol: Protocol::IoT16,
            vendor: "Garo".to_string(),
            model: "CPF25 Family".to_string(),
            serial: "891234A56711".to_string(),
            firmware: "1.1".to_string(),
        }
    }

    fn location() -> Location {
        Location {
            street: "Rakietowa".to_string(),
            house_number: "1A".to_string(),
            city: "Wrocław".to_string(),
            postal_code: "54-621".to_string(),
            state: None,
            country: "POL".to_string(),
            coordinates: None,
        }
    }

    fn started() -> InstallationProcess {
        let mut process = InstallationProcess::start(order());
        process.committed(1);
        process
    }

    fn booted(device_id: &str) -> InstallationProcess {
        let mut process = started();
        process.assign_device(device_id).unwrap();
        assert!(process.handle_boot_notification(&boot(device_id)));
        process.committed(2);
        process
    }

    #[test]
    fn test_start_is_pending() {
        let process = InstallationProcess::start(order());

        assert_eq!(process.state(), InstallationState::Pending);
        assert_eq!(process.ownership().operator.as_deref(), Some("Devicex.nl"));
        assert!(process.is_new());
        assert_eq!(process.pending_events().len(), 1);
        assert_eq!(process.pending_events()[0].event_type(), "InstallationStarted");
    }

    #[test]
    fn test_assign_then_boot() {
        let mut process = started();

        process.assign_device("D1").unwrap();
        assert_eq!(process.state(), InstallationState::DeviceAssigned);

        assert!(process.handle_boot_notification(&boot("D1")));
        assert_eq!(process.state(), InstallationState::Booted);

        assert!(!process.handle_boot_notification(&boot("D2")));
        assert_eq!(process.state(), InstallationState::Booted);
        assert_eq!(process.device_id(), Some("D1"));
    }

    #[test]
    fn test_boot_from_other_device_is_ignored() {
        let mut process = started();
        process.assign_device("D1").unwrap();

        assert!(!process.handle_boot_notification(&boot("D2")));
        assert_eq!(process.state(), InstallationState::DeviceAssigned);
        assert!(process.boot().is_none());
    }

    #[test]
    fn test_boot_before_assignment_is_ignored() {
        let mut process = started();

        assert!(!process.handle_boot_notification(&boot("D1")));
        assert_eq!(process.state(), InstallationState::Pending);
    }

    #[test]
    fn test_reassign_device_overwrites() {
        let mut process = started();
        process.assign_device("D1").unwrap();
        process.assign_device("D2").unwrap();

        assert_eq!(process.device_id(), Some("D2"));
        assert_eq!(process.pending_events().len(), 2);
    }

    #[test]
    fn test_assign_device_after_boot_fails() {
        let mut process = booted("D1");

        let err = process.assign_device("D2").unwrap_err();

        assert_eq!(err, DomainError::invalid_transition("assign device", "BOOTED"));
        assert_eq!(process.device_id(), Some("D1"));
        assert!(process.pending_events().is_empty());
    }

    #[test]
    fn test_blank_device_id_rejected() {
        let mut process = started();
        assert!(matches!(
            process.assign_device("  "),
            Err(DomainError::InvalidConfiguration(_))
        ));
        assert_eq!(process.state(), InstallationState::Pending);
    }

    #[test]
    fn test_confirm_without_boot_fails() {
        let mut process = started();
        process.assign_device("D1").unwrap();

        let err = process.confirm_boot_data().unwrap_err();

        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(process.state(), InstallationState::DeviceAssigned);
        assert!(!process.is_confirmed());
    }

    #[test]
    fn test_last_boot_wins() {
        let mut process = booted("D1");
        let mut reboot = boot("D1");
        reboot.firmware = "1.2".to_string();

        assert!(process.handle_boot_notification(&reboot));
        assert_eq!(process.boot().map(|b| b.firmware.as_str()), Some("1.2"));
        assert_eq!(process.state(), InstallationState::Booted);
    }

    #[test]
    fn test_complete_requires_confirmation() {
        let mut process = booted("D1");

        let err = process.complete().unwrap_err();

        assert_eq!(err, DomainError::invalid_transition("complete", "BOOTED"));
        assert_eq!(process.state(), InstallationState::Booted);
    }

    #[test]
    fn test_complete_returns_result() {
        let mut process = booted("D1");
        process.assign_location(location()).unwrap();
        process.confirm_boot_data().unwrap();

        let result = process.complete().unwrap();

        assert_eq!(process.state(), InstallationState::Completed);
        assert!(result.confirmed);
        assert_eq!(result.device_id, "D1");
        assert_eq!(result.location, Some(location()));
        assert_eq!(result.ownership, Ownership::new("Devicex.nl", "public-devices"));
    }

    #[test]
    fn test_complete_twice_is_idempotent() {
        let mut process = booted("D1");
        process.confirm_boot_data().unwrap();

        let first = process.complete().unwrap();
        let second = process.complete().unwrap();

        assert_eq!(first, second);
        let completed = process
            .pending_events()
            .iter()
            .filter(|e| e.event_type() == "InstallationCompleted")
            .count();
        assert_eq!(completed, 1);
    }

    #[test]
    fn test_completed_process_ignores_boot() {
        let mut process = booted("D1");
        process.confirm_boot_data().unwrap();
        process.complete().unwrap();

        assert!(!process.handle_boot_notification(&boot("D1")));
        assert_eq!(process.state(), InstallationState::Completed);
        assert!(process.assign_location(location()).is_err());
        assert!(process.confirm_boot_data().is_err());
    }

    #[test]
    fn test_state_never_regresses() {
        let mut process = started();
        process.assign_device("D1").unwrap();
        let mut last = process.state();

        for device_id in ["D2", "D1", "D1", "D3"] {
            process.handle_boot_notification(&boot(device_id));
            assert!(process.state() >= last);
            last = process.state();
        }
        assert_eq!(last, InstallationState::Booted);
    }

    #[test]
    fn test_record_carries_derived_state() {
        let mut process = booted("D1");
        process.confirm_boot_data().unwrap();

        let record = process.to_record();
        assert_eq!(record.state, InstallationState::Booted);
        assert_eq!(record.version, 2);

        let restored = InstallationProcess::from_record(record);
        assert_eq!(restored.state(), InstallationState::Booted);
        assert!(restored.is_confirmed());
        assert!(restored.pending_events().is_empty());
    }
}
