mod service;

pub use service::{IntervalsService, RulesSnapshot};
