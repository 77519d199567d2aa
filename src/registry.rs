//! Fixed, read-only list of cities shown on the map.
//!
//! The registry is built once at startup and shared by reference-counted
//! slice; position in the list is the only identity a city has, and bulk
//! air-quality results are matched back to cities by that position.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RegistryError;

/// One city on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    /// Display name.
    pub name: String,
    /// Latitude in decimal degrees.
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[serde(rename = "lon", alias = "longitude")]
    pub longitude: f64,
}

impl CityRecord {
    /// Create a new city record.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Built-in city list, in display order.
const DEFAULT_CITIES: &[(&str, f64, f64)] = &[
    ("New York", 40.7128, -74.0060),
    ("London", 51.5074, -0.1278),
    ("Tokyo", 35.6895, 139.6917),
    ("Paris", 48.8566, 2.3522),
    ("Beijing", 39.9042, 116.4074),
    ("New Delhi", 28.6139, 77.2090),
    ("Sydney", -33.8688, 151.2093),
    ("Sao Paulo", -23.5505, -46.6333),
    ("Cairo", 30.0444, 31.2357),
    ("Moscow", 55.7558, 37.6173),
    ("Los Angeles", 34.0522, -118.2437),
    ("Bangkok", 13.7563, 100.5018),
    ("Mexico City", 19.4326, -99.1332),
    ("Mumbai", 19.0760, 72.8777),
    ("Dubai", 25.2048, 55.2708),
    ("Singapore", 1.3521, 103.8198),
    ("Istanbul", 41.0082, 28.9784),
    ("Seoul", 37.5665, 126.9780),
    ("Shanghai", 31.2304, 121.4737),
    ("Berlin", 52.5200, 13.4050),
    ("Shrirampur", 19.6195, 74.6567),
];

/// Immutable ordered city list.
#[derive(Debug, Clone)]
pub struct CityRegistry {
    cities: Arc<[CityRecord]>,
}

impl CityRegistry {
    /// Build a registry from records, keeping their order.
    pub fn new(cities: Vec<CityRecord>) -> Self {
        Self {
            cities: cities.into(),
        }
    }

    /// Parse a JSON array of `{name, lat, lon}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let cities: Vec<CityRecord> = serde_json::from_str(json)?;
        if cities.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self::new(cities))
    }

    /// Load a registry from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&contents)?;
        info!(path = %path.display(), cities = registry.len(), "Loaded city registry");
        Ok(registry)
    }

    /// Load from `path` when given, otherwise use the built-in list.
    pub fn load(path: Option<&Path>) -> Result<Self, RegistryError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Cities in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, CityRecord> {
        self.cities.iter()
    }

    /// Cities as a slice.
    pub fn as_slice(&self) -> &[CityRecord] {
        &self.cities
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether the registry has no cities.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Latitudes in registry order.
    pub fn latitudes(&self) -> Vec<f64> {
        self.cities.iter().map(|c| c.latitude).collect()
    }

    /// Longitudes in registry order.
    pub fn longitudes(&self) -> Vec<f64> {
        self.cities.iter().map(|c| c.longitude).collect()
    }
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_CITIES
                .iter()
                .map(|&(name, lat, lon)| CityRecord::new(name, lat, lon))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a CityRegistry {
    type Item = &'a CityRecord;
    type IntoIter = std::slice::Iter<'a, CityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
