mod pattern;
mod repository;
mod rules;

pub use pattern::Pattern;
pub use repository::IntervalRulesRepository;
pub use rules::{DeviceIdRule, IntervalRules, ModelRule};
