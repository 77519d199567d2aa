//! Bulk AQI for every city in the registry.
//!
//! All registry coordinates go out in a single upstream request. The
//! upstream answers with a list in request order, and entry `i` is taken
//! to belong to city `i` without comparing coordinates. Any response that
//! is not a list (the single-point object shape included) yields an empty
//! result rather than an error.

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::UpstreamError;
use crate::metrics;
use crate::registry::{CityRecord, CityRegistry};
use crate::upstream::OpenMeteoClient;

use super::types::AqiResult;

/// Max distance in degrees between a requested city and the grid point
/// the upstream echoes back before alignment checks complain.
const ALIGNMENT_TOLERANCE_DEG: f64 = 1.0;

/// Fetch current US AQI for every registry city, in registry order.
#[instrument(skip(client, registry), fields(cities = registry.len()))]
pub async fn fetch_city_aqi(
    client: &OpenMeteoClient,
    registry: &CityRegistry,
    verify_alignment: bool,
) -> Result<Vec<AqiResult>, UpstreamError> {
    if registry.is_empty() {
        return Ok(Vec::new());
    }

    let payload = client
        .air_quality_bulk(&registry.latitudes(), &registry.longitudes())
        .await?;

    let results = align_bulk_response(registry.as_slice(), &payload, verify_alignment);

    let missing = results.iter().filter(|r| r.aqi.is_none()).count();
    metrics::inc_missing_aqi(missing as u64);

    info!(
        results = results.len(),
        missing_aqi = missing,
        "Aggregated city AQI"
    );

    Ok(results)
}

/// Map a bulk air-quality payload back onto cities by position.
pub fn align_bulk_response(
    cities: &[CityRecord],
    payload: &Value,
    verify_alignment: bool,
) -> Vec<AqiResult> {
    let items = match payload {
        Value::Array(items) => items,
        _ => {
            warn!("Bulk air-quality response is not a list, returning no results");
            return Vec::new();
        }
    };

    if items.len() != cities.len() {
        warn!(
            expected = cities.len(),
            received = items.len(),
            "Bulk air-quality response length differs from registry"
        );
    }

    // Surplus upstream entries are dropped rather than failing the request.
    cities
        .iter()
        .zip(items)
        .map(|(city, item)| {
            if verify_alignment {
                check_alignment(city, item);
            }
            AqiResult::for_city(city, extract_us_aqi(item))
        })
        .collect()
}

/// Read `current.us_aqi` from one upstream entry.
///
/// Missing, null and non-numeric values give `None`. Fractional values are
/// rounded.
pub fn extract_us_aqi(item: &Value) -> Option<i64> {
    let value = item.get("current")?.get("us_aqi")?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v.round() as i64))
}

fn check_alignment(city: &CityRecord, item: &Value) {
    let echoed = (
        item.get("latitude").and_then(Value::as_f64),
        item.get("longitude").and_then(Value::as_f64),
    );

    if let (Some(lat), Some(lon)) = echoed {
        if (lat - city.latitude).abs() > ALIGNMENT_TOLERANCE_DEG
            || (lon - city.longitude).abs() > ALIGNMENT_TOLERANCE_DEG
        {
            warn!(
                city = %city.name,
                requested_lat = city.latitude,
                requested_lon = city.longitude,
                echoed_lat = lat,
                echoed_lon = lon,
                "Bulk air-quality entry does not match its city"
            );
        }
    }
}
