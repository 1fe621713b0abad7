mod boot;
mod known_device;
mod statuses;

pub use boot::{BootData, BootNotification, BootResponse, Protocol};
pub use known_device::{KnownDeviceState, RegistrationStatus};
pub use statuses::DeviceStatuses;
