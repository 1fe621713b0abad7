//! Application layer - Use cases and business workflows

pub mod communication;
pub mod device;
pub mod installation;
pub mod intervals;
pub mod messaging;
pub mod projection;
pub mod unit_of_work;

pub use communication::CommunicationService;
pub use device::{DeviceService, DeviceUpdate};
pub use installation::InstallationService;
pub use intervals::IntervalsService;
pub use messaging::{BusListener, MessageRouter};
pub use projection::{DevicesReadModel, KnownDevicesReadModel, ProjectionPublisher};
pub use unit_of_work::{RetryPolicy, UnitOfWork};
