pub mod bus;
pub mod composite_publisher;
pub mod messages;
pub mod mqtt_publisher;

pub use composite_publisher::CompositeEventPublisher;
