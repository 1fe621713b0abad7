use crate::aggregate::Aggregate;
use crate::event::DomainEvent;

use super::{
    DeviceConfiguration, DeviceRecord, Location, OpeningHours, Ownership, Settings,
    SettingsUpdate, Violations, Visibility,
};

/// Device aggregate root.
///
/// Created once when an installation completes. Every mutation buffers a
/// `DeviceConfigured` snapshot which the store hands out after a successful
/// save.
#[derive(Debug, Clone)]
pub struct Device {
    device_id: String,
    ownership: Ownership,
    location: Option<Location>,
    opening_hours: OpeningHours,
    settings: Settings,
    version: u64,
    events: Vec<DomainEvent>,
}

impl Device {
    /// Create a new device with default settings, open around the clock
    pub fn create(device_id: String, ownership: Ownership, location: Option<Location>) -> Self {
        let mut device = Self {
            device_id,
            ownership,
            location,
            opening_hours: OpeningHours::always_open(),
            settings: Settings::default(),
            version: 0,
            events: Vec::new(),
        };
        device.configured();
        device
    }

    /// Rebuild from storage; no events are buffered.
    pub fn from_record(record: DeviceRecord) -> Self {
        Self {
            device_id: record.device_id,
            ownership: record.ownership,
            location: record.location,
            opening_hours: record.opening_hours,
            settings: record.settings,
            version: record.version,
            events: Vec::new(),
        }
    }

    pub fn to_record(&self) -> DeviceRecord {
        DeviceRecord {
            device_id: self.device_id.clone(),
            ownership: self.ownership.clone(),
            location: self.location.clone(),
            opening_hours: self.opening_hours.clone(),
            settings: self.settings,
            version: self.version,
        }
    }

    // Getters
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn opening_hours(&self) -> &OpeningHours {
        &self.opening_hours
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn violations(&self) -> Violations {
        Violations::of(&self.ownership, self.location.as_ref(), &self.settings)
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::of(&self.violations(), &self.settings)
    }

    pub fn configuration(&self) -> DeviceConfiguration {
        DeviceConfiguration {
            device_id: self.device_id.clone(),
            ownership: self.ownership.clone(),
            location: self.location.clone(),
            opening_hours: self.opening_hours.clone(),
            settings: self.settings,
            violations: self.violations(),
            visibility: self.visibility(),
        }
    }

    /// `None` resets to always open
    pub fn update_opening_hours(&mut self, opening_hours: Option<OpeningHours>) {
        self.opening_hours = opening_hours.unwrap_or_default();
        self.configured();
    }

    pub fn update_settings(&mut self, update: &SettingsUpdate) {
        self.settings = self.settings.merge(update);
        self.configured();
    }

    pub fn update_location(&mut self, location: Option<Location>) {
        self.location = location;
        self.configured();
    }

    pub fn update_ownership(&mut self, ownership: Ownership) {
        self.ownership = ownership;
        self.configured();
    }

    /// Transfer the device to the unowned sentinel
    pub fn reset_ownership(&mut self) {
        self.update_ownership(Ownership::unowned());
    }

    fn configured(&mut self) {
        let configuration = self.configuration();
        self.events
            .push(DomainEvent::device_configured(configuration));
    }
}

impl Aggregate for Device {
    fn aggregate_id(&self) -> &str {
        &self.device_id
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
