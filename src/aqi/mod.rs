//! Air-quality lookups served by the API.
//!
//! - [`aggregator`]: one bulk upstream call for every registry city
//! - [`search`]: geocode a query, then fetch AQI for that point
//! - [`types`]: result records returned to clients

pub mod aggregator;
pub mod search;
pub mod types;

pub use aggregator::{align_bulk_response, extract_us_aqi, fetch_city_aqi};
pub use search::{compose_display_name, search_location};
pub use types::AqiResult;
