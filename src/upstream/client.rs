//! Open-Meteo HTTP client wrapper.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::UpstreamError;
use crate::metrics::{self, LatencyTimer};

use super::types::{GeocodeMatch, GeocodeResponse};

/// Label for the geocoding upstream in errors and metrics.
pub const GEOCODING_ENDPOINT: &str = "geocoding";
/// Label for the air-quality upstream in errors and metrics.
pub const AIR_QUALITY_ENDPOINT: &str = "air-quality";

/// Metric requested from the air-quality API.
const CURRENT_METRIC: &str = "us_aqi";

/// Client for the Open-Meteo geocoding and air-quality APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Geocoding search URL.
    geocoding_url: String,
    /// Air-quality URL.
    air_quality_url: String,
}

impl OpenMeteoClient {
    /// Create a client from config. No timeout is set unless configured.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("aqi-map/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout_ms) = config.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self::with_http(
            builder.build()?,
            config.geocoding_url.clone(),
            config.air_quality_url.clone(),
        ))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        geocoding_url: impl Into<String>,
        air_quality_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            geocoding_url: geocoding_url.into(),
            air_quality_url: air_quality_url.into(),
        }
    }

    /// Get the geocoding URL.
    pub fn geocoding_url(&self) -> &str {
        &self.geocoding_url
    }

    /// Get the air-quality URL.
    pub fn air_quality_url(&self) -> &str {
        &self.air_quality_url
    }

    /// Resolve a place name to its best match.
    #[instrument(skip(self))]
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodeMatch>, UpstreamError> {
        let params = [
            ("name", query.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let response: GeocodeResponse = self
            .get_json(GEOCODING_ENDPOINT, &self.geocoding_url, &params)
            .await?;

        let found = response.into_first_match();
        match &found {
            Some(m) => debug!(name = %m.name, country = %m.country, "Geocoded query"),
            None => debug!("Geocoder returned no results"),
        }
        Ok(found)
    }

    /// Fetch current US AQI for many points in one request.
    ///
    /// `latitudes` and `longitudes` must be index-aligned. The raw body is
    /// returned: a list for several points, a single object for one.
    #[instrument(skip(self, latitudes, longitudes), fields(points = latitudes.len()))]
    pub async fn air_quality_bulk(
        &self,
        latitudes: &[f64],
        longitudes: &[f64],
    ) -> Result<Value, UpstreamError> {
        let params = [
            ("latitude", join_coordinates(latitudes)),
            ("longitude", join_coordinates(longitudes)),
            ("current", CURRENT_METRIC.to_string()),
        ];

        self.get_json(AIR_QUALITY_ENDPOINT, &self.air_quality_url, &params)
            .await
    }

    /// Fetch current US AQI for one point.
    #[instrument(skip(self))]
    pub async fn air_quality_at(&self, latitude: f64, longitude: f64) -> Result<Value, UpstreamError> {
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_METRIC.to_string()),
        ];

        self.get_json(AIR_QUALITY_ENDPOINT, &self.air_quality_url, &params)
            .await
    }

    /// GET `url` with `params` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let result = self.send_and_decode(endpoint, url, params).await;
        if let Err(e) = &result {
            warn!(endpoint, error = %e, "Upstream request failed");
            metrics::inc_upstream_failures(endpoint);
        }
        result
    }

    async fn send_and_decode<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let timer = LatencyTimer::new(endpoint);

        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|source| UpstreamError::Request { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { endpoint, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Request { endpoint, source })?;

        debug!(
            endpoint,
            status = %status,
            bytes = body.len(),
            latency_ms = timer.elapsed_ms(),
            "Upstream response received"
        );

        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }
}

/// Join coordinates as a comma-separated decimal list.
pub fn join_coordinates(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
