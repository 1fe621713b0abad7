//! Domain layer - Pure business logic with no infrastructure dependencies
//!
//! This crate contains:
//! - Aggregates (InstallationProcess, Device)
//! - Value Objects (Ownership, Location, Settings, BootNotification)
//! - The interval rule matcher
//! - Domain Events
//! - Repository interfaces (traits)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Business rules enforced at domain level
//! - Derived state (installation state, violations, visibility) is computed,
//!   never stored as source of truth

pub mod aggregate;
pub mod communication;
pub mod device;
pub mod error;
pub mod event;
pub mod installation;
pub mod intervals;

// Re-export commonly used types
pub use aggregate::Aggregate;
pub use communication::{BootNotification, BootResponse, DeviceStatuses, KnownDeviceState};
pub use device::{Device, DeviceConfiguration, DeviceStore, Ownership};
pub use error::DomainError;
pub use event::{DomainEvent, EventPublisher};
pub use installation::{InstallationProcess, InstallationState, ProcessStore, WorkOrder};
pub use intervals::{IntervalRules, IntervalRulesRepository};
