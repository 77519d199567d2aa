//! Air-quality map backend.
//!
//! Serves current US AQI for a fixed list of cities and an ad-hoc location
//! search, backed by the Open-Meteo geocoding and air-quality APIs.
//!
//! ```text
//! GET /api/aqi            -> [{name, lat, lon, aqi}, ...]   one upstream call
//! GET /api/search?q=Paris -> {name, lat, lon, aqi}          geocode, then AQI
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`registry`]: The fixed city list
//! - [`upstream`]: Open-Meteo client
//! - [`aqi`]: Bulk aggregation and search & enrich
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod aqi;
pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod upstream;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, AppError, Result};
