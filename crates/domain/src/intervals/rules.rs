use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use super::Pattern;
use crate::DomainError;
use crate::communication::BootNotification;

/// Interval for an explicit set of device ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdRule {
    pub seconds: u32,
    pub devices: BTreeSet<String>,
}

impl DeviceIdRule {
    pub fn matches(&self, boot: &BootNotification) -> bool {
        self.devices.contains(&boot.device_id)
    }
}

/// Interval for a vendor's models, optionally narrowed to some firmware.
/// A missing firmware pattern matches any firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRule {
    pub seconds: u32,
    pub vendor: String,
    pub model: Pattern,
    #[serde(default)]
    pub firmware: Option<Pattern>,
}

impl ModelRule {
    pub fn matches(&self, boot: &BootNotification) -> bool {
        self.vendor == boot.vendor
            && self.model.matches(&boot.model)
            && self
                .firmware
                .as_ref()
                .is_none_or(|firmware| firmware.matches(&boot.firmware))
    }
}

/// Prioritized rules choosing how often a device reports in.
///
/// Device-id rules are evaluated first, then model rules, each in list
/// order; the first match wins. Nothing matching falls back to
/// `def_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRules {
    #[serde(default)]
    pub by_ids: Vec<DeviceIdRule>,
    #[serde(default)]
    pub by_model: Vec<ModelRule>,
    pub def_seconds: u32,
}

impl IntervalRules {
    pub const DEFAULT_SECONDS: u32 = 1800;

    pub fn new(by_ids: Vec<DeviceIdRule>, by_model: Vec<ModelRule>, def_seconds: u32) -> Self {
        Self {
            by_ids,
            by_model,
            def_seconds,
        }
    }

    /// No rules, everything reports at `def_seconds`
    pub fn default_rules(def_seconds: u32) -> Self {
        Self::new(Vec::new(), Vec::new(), def_seconds)
    }

    pub fn calculate_interval(&self, boot: &BootNotification) -> Duration {
        Duration::from_secs(u64::from(self.matching_seconds(boot)))
    }

    fn matching_seconds(&self, boot: &BootNotification) -> u32 {
        self.by_ids
            .iter()
            .find(|rule| rule.matches(boot))
            .map(|rule| rule.seconds)
            .or_else(|| {
                self.by_model
                    .iter()
                    .find(|rule| rule.matches(boot))
                    .map(|rule| rule.seconds)
            })
            .unwrap_or(self.def_seconds)
    }

    /// Reject zero intervals; a device told to report every 0s would flood us.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.def_seconds == 0 {
            return Err(DomainError::InvalidConfiguration(
                "defSeconds must be positive".to_string(),
            ));
        }
        let zero_id_rule = self.by_ids.iter().any(|rule| rule.seconds == 0);
        let zero_model_rule = self.by_model.iter().any(|rule| rule.seconds == 0);
        if zero_id_rule || zero_model_rule {
            return Err(DomainError::InvalidConfiguration(
                "rule seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IntervalRules {
    fn default() -> Self {
        Self::default_rules(Self::DEFAULT_SECONDS)
    }
}
