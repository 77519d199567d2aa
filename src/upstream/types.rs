//! Wire types for the Open-Meteo geocoding API.
//!
//! Air-quality responses are kept as raw [`serde_json::Value`] because the
//! bulk endpoint answers with either a list or a single object.

use serde::{Deserialize, Serialize};

/// Geocoding search response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    /// Matches, absent when nothing was found.
    #[serde(default)]
    pub results: Option<Vec<GeocodeResult>>,
}

/// One geocoding hit as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    /// Place name.
    pub name: String,
    /// Country name, when known.
    #[serde(default)]
    pub country: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// The single place a query resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeMatch {
    /// Place name.
    pub name: String,
    /// Country name, empty when the geocoder omitted it.
    pub country: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl From<GeocodeResult> for GeocodeMatch {
    fn from(result: GeocodeResult) -> Self {
        Self {
            name: result.name,
            country: result.country.unwrap_or_default(),
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

impl GeocodeResponse {
    /// First match only; the rest are discarded.
    pub fn into_first_match(self) -> Option<GeocodeMatch> {
        self.results
            .and_then(|results| results.into_iter().next())
            .map(GeocodeMatch::from)
    }
}
