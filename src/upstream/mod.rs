//! Open-Meteo upstream access.
//!
//! This module handles:
//! - Geocoding a free-text place name to one coordinate
//! - Fetching current US AQI for one or many coordinates
//! - Wire types for the upstream JSON

pub mod client;
pub mod types;

pub use client::{OpenMeteoClient, AIR_QUALITY_ENDPOINT, GEOCODING_ENDPOINT};
pub use types::{GeocodeMatch, GeocodeResponse};
