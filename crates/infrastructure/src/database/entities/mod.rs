pub mod configs;
pub mod device_events;
pub mod devices;
pub mod installation_events;
pub mod installation_processes;
