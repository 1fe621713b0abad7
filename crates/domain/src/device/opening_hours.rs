use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// When a device is available to customers.
///
/// Absence of opening hours always means "always open"; the aggregate never
/// stores a missing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub always_open: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opened: Vec<OpeningTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningTime {
    pub day: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningHours {
    pub fn always_open() -> Self {
        Self {
            always_open: true,
            opened: Vec::new(),
        }
    }

    pub fn opened_at(opened: Vec<OpeningTime>) -> Self {
        Self {
            always_open: false,
            opened,
        }
    }

    pub fn is_open(&self, day: Weekday, time: NaiveTime) -> bool {
        self.always_open
            || self
                .opened
                .iter()
                .any(|slot| slot.day == day && slot.open <= time && time < slot.close)
    }
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self::always_open()
    }
}
