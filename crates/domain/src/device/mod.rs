mod aggregate;
mod configuration;
mod location;
mod opening_hours;
mod ownership;
mod repository;
mod settings;
mod violations;

pub use aggregate::Device;
pub use configuration::{DeviceConfiguration, DeviceRecord};
pub use location::{Coordinates, Location};
pub use opening_hours::{OpeningHours, OpeningTime};
pub use ownership::Ownership;
pub use repository::DeviceStore;
pub use settings::{Settings, SettingsUpdate};
pub use violations::{ForCustomer, Violations, Visibility};
