//! Infrastructure layer - Storage, configuration and bus integrations

pub mod config;
pub mod database;
pub mod memory;
pub mod messaging;

pub use config::ServerConfig;
pub use database::{SeaOrmDeviceStore, SeaOrmIntervalRulesRepository, SeaOrmProcessStore};
pub use memory::{
    EventLogEntry, InMemoryDeviceStore, InMemoryIntervalRulesRepository, InMemoryProcessStore,
};
pub use messaging::composite_publisher::CompositeEventPublisher;
pub use messaging::bus::{BusConnection, BusMessage, BusPublisher};
pub use messaging::mqtt_publisher::MqttEventPublisher;
