use serde::{Deserialize, Serialize};

use super::{Location, Ownership, Settings};

/// Configuration inconsistencies that need attention.
/// Every flag is computed independently of the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violations {
    pub operator_not_assigned: bool,
    pub provider_not_assigned: bool,
    pub location_missing: bool,
    pub show_on_map_but_missing_location: bool,
    pub show_on_map_but_no_public_access: bool,
}

impl Violations {
    pub fn of(ownership: &Ownership, location: Option<&Location>, settings: &Settings) -> Self {
        let location_missing = location.is_none();
        Self {
            operator_not_assigned: !ownership.operator_assigned(),
            provider_not_assigned: !ownership.provider_assigned(),
            location_missing,
            show_on_map_but_missing_location: settings.show_on_map && location_missing,
            show_on_map_but_no_public_access: settings.show_on_map && !settings.public_access,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Customer-facing accessibility of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForCustomer {
    UsableAndVisibleOnMap,
    InaccessibleAndHiddenOnMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    pub roaming_enabled: bool,
    pub for_customer: ForCustomer,
}

impl Visibility {
    pub fn of(violations: &Violations, settings: &Settings) -> Self {
        let roaming_enabled = settings.public_access
            && !violations.operator_not_assigned
            && !violations.provider_not_assigned;

        let for_customer =
            if settings.show_on_map && settings.public_access && !violations.location_missing {
                ForCustomer::UsableAndVisibleOnMap
            } else {
                ForCustomer::InaccessibleAndHiddenOnMap
            };

        Self {
            roaming_enabled,
            for_customer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location {
            street: "Rakietowa".to_string(),
            house_number: "1A".to_string(),
            city: "Wrocław".to_string(),
            postal_code: "54-621".to_string(),
            state: None,
            country: "POL".to_string(),
            coordinates: None,
        }
    }

    #[test]
    fn test_no_violations_for_complete_configuration() {
        let settings = Settings {
            show_on_map: true,
            public_access: true,
            ..Default::default()
        };
        let violations = Violations::of(
            &Ownership::new("Devicex.nl", "public-devices"),
            Some(&location()),
            &settings,
        );

        assert!(violations.is_empty());

        let visibility = Visibility::of(&violations, &settings);
        assert!(visibility.roaming_enabled);
        assert_eq!(visibility.for_customer, ForCustomer::UsableAndVisibleOnMap);
    }

    #[test]
    fn test_show_on_map_without_public_access() {
        let settings = Settings {
            show_on_map: true,
            public_access: false,
            ..Default::default()
        };
        let violations = Violations::of(
            &Ownership::new("Devicex.nl", "public-devices"),
            Some(&location()),
            &settings,
        );

        assert!(violations.show_on_map_but_no_public_access);
        assert!(!violations.show_on_map_but_missing_location);
        assert!(!violations.location_missing);

        let visibility = Visibility::of(&violations, &settings);
        assert!(!visibility.roaming_enabled);
        assert_eq!(
            visibility.for_customer,
            ForCustomer::InaccessibleAndHiddenOnMap
        );
    }

    #[test]
    fn test_show_on_map_without_location() {
        let settings = Settings {
            show_on_map: true,
            public_access: true,
            ..Default::default()
        };
        let violations = Violations::of(&Ownership::unowned(), None, &settings);

        assert!(violations.operator_not_assigned);
        assert!(violations.provider_not_assigned);
        assert!(violations.location_missing);
        assert!(violations.show_on_map_but_missing_location);
        assert!(!violations.show_on_map_but_no_public_access);

        let visibility = Visibility::of(&violations, &settings);
        assert!(!visibility.roaming_enabled);
        assert_eq!(
            visibility.for_customer,
            ForCustomer::InaccessibleAndHiddenOnMap
        );
    }

    #[test]
    fn test_roaming_requires_both_parties() {
        let settings = Settings {
            public_access: true,
            ..Default::default()
        };
        let ownership = Ownership {
            operator: Some("Devicex.nl".to_string()),
            provider: None,
        };
        let violations = Violations::of(&ownership, Some(&location()), &settings);

        assert!(!violations.operator_not_assigned);
        assert!(violations.provider_not_assigned);
        assert!(!Visibility::of(&violations, &settings).roaming_enabled);
    }

    #[test]
    fn test_for_customer_serialization() {
        assert_eq!(
            serde_json::to_value(ForCustomer::UsableAndVisibleOnMap).unwrap(),
            serde_json::json!("USABLE_AND_VISIBLE_ON_MAP")
        );
        assert_eq!(
            serde_json::to_value(ForCustomer::InaccessibleAndHiddenOnMap).unwrap(),
            serde_json::json!("INACCESSIBLE_AND_HIDDEN_ON_MAP")
        );
    }
}
