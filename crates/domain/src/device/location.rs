use serde::{Deserialize, Serialize};

/// Postal address of an installed device, optionally geo-referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub postal_code: String,
    pub state: Option<String>,
    pub country: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}
