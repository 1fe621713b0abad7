use domain::communication::BootNotification;
use domain::device::{Device, DeviceStore, Location};
use domain::installation::{
    CompletionResult, InstallationProcess, InstallationProcessState, InstallationState,
    ProcessStore, WorkOrder,
};
use domain::DomainError;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::unit_of_work::UnitOfWork;

/// Drives installation processes from work orders to created devices
pub struct InstallationService {
    processes: Arc<dyn ProcessStore>,
    devices: Arc<dyn DeviceStore>,
    uow: Arc<UnitOfWork>,
}

impl InstallationService {
    pub fn new(
        processes: Arc<dyn ProcessStore>,
        devices: Arc<dyn DeviceStore>,
        uow: Arc<UnitOfWork>,
    ) -> Self {
        Self {
            processes,
            devices,
            uow,
        }
    }

    /// Start an installation for a new work order
    pub async fn handle_work_order(&self, order: WorkOrder) -> Result<(), DomainError> {
        let order_id = order.order_id.clone();
        let mut process = InstallationProcess::start(order);
        self.uow.create(self.processes.as_ref(), &mut process).await?;
        info!(order_id = %order_id, "✅ Installation started");
        Ok(())
    }

    pub async fn assign_device(
        &self,
        order_id: &str,
        device_id: &str,
    ) -> Result<InstallationProcessState, DomainError> {
        let view = self
            .uow
            .execute(self.processes.as_ref(), order_id, |p: &mut InstallationProcess| {
                p.assign_device(device_id)?;
                Ok(p.view())
            })
            .await?;
        info!(order_id = %order_id, device_id = %device_id, "Device assigned");
        Ok(view)
    }

    pub async fn assign_location(
        &self,
        order_id: &str,
        location: Location,
    ) -> Result<InstallationProcessState, DomainError> {
        self.uow
            .execute(self.processes.as_ref(), order_id, |p: &mut InstallationProcess| {
                p.assign_location(location.clone())?;
                Ok(p.view())
            })
            .await
    }

    /// Hand a boot notification to the open installation of the device, if any.
    ///
    /// Returns whether an installation recorded the boot.
    pub async fn handle_boot_notification(
        &self,
        boot: &BootNotification,
    ) -> Result<bool, DomainError> {
        let Some(process) = self.processes.get_by_device_id(&boot.device_id).await? else {
            debug!(device_id = %boot.device_id, "No installation for booting device");
            return Ok(false);
        };
        if process.state().is_terminal() {
            return Ok(false);
        }

        let applied = self
            .uow
            .try_execute(
                self.processes.as_ref(),
                process.order_id(),
                |p: &mut InstallationProcess| Ok(p.handle_boot_notification(boot)),
            )
            .await?
            .unwrap_or(false);

        if applied {
            info!(
                order_id = %process.order_id(),
                device_id = %boot.device_id,
                "Boot data received"
            );
        }
        Ok(applied)
    }

    pub async fn confirm_boot_data(
        &self,
        order_id: &str,
    ) -> Result<InstallationProcessState, DomainError> {
        self.uow
            .execute(self.processes.as_ref(), order_id, |p: &mut InstallationProcess| {
                p.confirm_boot_data()?;
                Ok(p.view())
            })
            .await
    }

    /// Complete the installation and create the device.
    ///
    /// Safe to repeat: the device is only created when it does not exist yet,
    /// which also heals a crash between completing and creating.
    pub async fn complete(&self, order_id: &str) -> Result<CompletionResult, DomainError> {
        let result = self
            .uow
            .execute(self.processes.as_ref(), order_id, |p: &mut InstallationProcess| {
                p.complete()
            })
            .await?;

        if result.confirmed && self.devices.get(&result.device_id).await?.is_none() {
            let mut device = Device::create(
                result.device_id.clone(),
                result.ownership.clone(),
                result.location.clone(),
            );
            match self.uow.create(self.devices.as_ref(), &mut device).await {
                Ok(()) => {
                    info!(order_id = %order_id, device_id = %result.device_id, "✅ Device created")
                }
                Err(DomainError::AlreadyExists(_)) => {
                    warn!(device_id = %result.device_id, "Device created concurrently");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }

    pub async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<InstallationProcessState, DomainError> {
        self.processes
            .get_by_order_id(order_id)
            .await?
            .map(|p| p.view())
            .ok_or_else(|| DomainError::NotFound(order_id.to_string()))
    }

    pub async fn get_by_device_id(
        &self,
        device_id: &str,
    ) -> Result<Option<InstallationProcessState>, DomainError> {
        Ok(self
            .processes
            .get_by_device_id(device_id)
            .await?
            .map(|p| p.view()))
    }

    /// Processes in any of `states`; empty means all
    pub async fn find_by_states(
        &self,
        states: &[InstallationState],
    ) -> Result<Vec<InstallationProcessState>, DomainError> {
        self.processes.find_by_states(states).await
    }
}
