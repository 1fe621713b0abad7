use serde::{Deserialize, Serialize};

/// Operator/provider pair identifying who administratively controls a device.
///
/// A blank or absent party counts as not assigned. A device with neither
/// party assigned is "unowned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub operator: Option<String>,
    pub provider: Option<String>,
}

impl Ownership {
    pub fn new(operator: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            operator: Some(operator.into()),
            provider: Some(provider.into()),
        }
    }

    pub fn unowned() -> Self {
        Self::default()
    }

    pub fn operator_assigned(&self) -> bool {
        is_present(&self.operator)
    }

    pub fn provider_assigned(&self) -> bool {
        is_present(&self.provider)
    }

    pub fn is_unowned(&self) -> bool {
        !self.operator_assigned() && !self.provider_assigned()
    }
}

fn is_present(party: &Option<String>) -> bool {
    party.as_deref().is_some_and(|p| !p.trim().is_empty())
}
