//! Read models built from domain events and bus messages.

mod devices_read_model;
mod known_devices;
mod publisher;

pub use devices_read_model::{DeviceDetails, DevicesReadModel};
pub use known_devices::KnownDevicesReadModel;
pub use publisher::ProjectionPublisher;
