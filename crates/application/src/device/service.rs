use domain::device::{
    Device, DeviceConfiguration, DeviceStore, Location, OpeningHours, Ownership, SettingsUpdate,
};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::unit_of_work::UnitOfWork;

/// Partial device update; absent parts are left untouched.
///
/// An empty `ownership` transfers the device to the unowned sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdate {
    #[serde(default)]
    pub settings: Option<SettingsUpdate>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub ownership: Option<Ownership>,
}

impl DeviceUpdate {
    pub fn is_empty(&self) -> bool {
        self.settings.is_none()
            && self.opening_hours.is_none()
            && self.location.is_none()
            && self.ownership.is_none()
    }

    fn apply(&self, device: &mut Device) {
        if let Some(settings) = &self.settings {
            device.update_settings(settings);
        }
        if let Some(opening_hours) = &self.opening_hours {
            device.update_opening_hours(Some(opening_hours.clone()));
        }
        if let Some(location) = &self.location {
            device.update_location(Some(location.clone()));
        }
        if let Some(ownership) = &self.ownership {
            if ownership.is_unowned() {
                device.reset_ownership();
            } else {
                device.update_ownership(ownership.clone());
            }
        }
    }
}

/// Device administration
pub struct DeviceService {
    devices: Arc<dyn DeviceStore>,
    uow: Arc<UnitOfWork>,
}

impl DeviceService {
    pub fn new(devices: Arc<dyn DeviceStore>, uow: Arc<UnitOfWork>) -> Self {
        Self { devices, uow }
    }

    /// Current configuration including derived violations and visibility
    pub async fn get(&self, device_id: &str) -> Result<DeviceConfiguration, DomainError> {
        self.devices
            .get(device_id)
            .await?
            .map(|device| device.configuration())
            .ok_or_else(|| DomainError::NotFound(device_id.to_string()))
    }

    pub async fn update(
        &self,
        device_id: &str,
        update: DeviceUpdate,
    ) -> Result<DeviceConfiguration, DomainError> {
        if update.is_empty() {
            return self.get(device_id).await;
        }

        let configuration = self
            .uow
            .execute(self.devices.as_ref(), device_id, |device: &mut Device| {
                update.apply(device);
                Ok(device.configuration())
            })
            .await?;

        info!(device_id = %device_id, "Device configuration updated");
        Ok(configuration)
    }

    /// Devices of one operator, by device id
    pub async fn find_by_operator(
        &self,
        operator: &str,
    ) -> Result<Vec<DeviceConfiguration>, DomainError> {
        Ok(self
            .devices
            .find_by_operator(operator)
            .await?
            .iter()
            .map(Device::configuration)
            .collect())
    }
}
