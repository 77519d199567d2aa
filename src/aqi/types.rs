//! Result records returned to clients.

use serde::Serialize;
use utoipa::ToSchema;

use crate::registry::CityRecord;

/// A named point with its current US AQI.
///
/// Serialized as `{name, lat, lon, aqi}`; `aqi` is `null` when the
/// upstream had no value for the point.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AqiResult {
    /// Display name.
    pub name: String,
    /// Latitude in decimal degrees.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Current US AQI.
    pub aqi: Option<i64>,
}

impl AqiResult {
    /// Pair a registry city with its AQI.
    pub fn for_city(city: &CityRecord, aqi: Option<i64>) -> Self {
        Self {
            name: city.name.clone(),
            latitude: city.latitude,
            longitude: city.longitude,
            aqi,
        }
    }
}
