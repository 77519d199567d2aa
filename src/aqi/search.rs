//! Free-text location search enriched with current AQI.

use tracing::{debug, instrument};

use crate::config::CountrySuffix;
use crate::error::ApiError;
use crate::upstream::{GeocodeMatch, OpenMeteoClient};

use super::aggregator::extract_us_aqi;
use super::types::AqiResult;

/// Resolve `query` to one place and attach its current US AQI.
///
/// The two upstream calls run in sequence: the air-quality request needs
/// the coordinate the geocoder returns.
#[instrument(skip(client))]
pub async fn search_location(
    client: &OpenMeteoClient,
    query: Option<&str>,
    suffix: CountrySuffix,
) -> Result<AqiResult, ApiError> {
    let query = match query {
        Some(q) if !q.is_empty() => q,
        _ => return Err(ApiError::MissingQuery),
    };

    let place = client
        .geocode(query)
        .await?
        .ok_or(ApiError::LocationNotFound)?;

    debug!(
        name = %place.name,
        lat = place.latitude,
        lon = place.longitude,
        "Resolved query, fetching AQI"
    );

    let payload = client
        .air_quality_at(place.latitude, place.longitude)
        .await?;

    Ok(AqiResult {
        name: compose_display_name(&place, suffix),
        latitude: place.latitude,
        longitude: place.longitude,
        aqi: extract_us_aqi(&payload),
    })
}

/// Build `"<name>, <country>"`.
///
/// With [`CountrySuffix::Always`] an empty country still leaves the
/// trailing `", "`.
pub fn compose_display_name(place: &GeocodeMatch, suffix: CountrySuffix) -> String {
    match suffix {
        CountrySuffix::WhenPresent if place.country.is_empty() => place.name.clone(),
        _ => format!("{}, {}", place.name, place.country),
    }
}
