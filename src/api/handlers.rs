//! HTTP API handlers.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{error, info};
use utoipa::IntoParams;

use crate::aqi::{fetch_city_aqi, search_location, AqiResult};
use crate::config::{Config, CountrySuffix};
use crate::error::{ApiError, AppError, ErrorBody};
use crate::metrics;
use crate::registry::CityRegistry;
use crate::upstream::OpenMeteoClient;

/// Application state shared with handlers. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream client.
    pub client: OpenMeteoClient,
    /// Cities for `/api/aqi`.
    pub registry: CityRegistry,
    /// Name formatting for search results.
    pub country_suffix: CountrySuffix,
    /// Log bulk entries that do not match their city.
    pub verify_alignment: bool,
}

impl AppState {
    /// Create new app state with default options.
    pub fn new(client: OpenMeteoClient, registry: CityRegistry) -> Self {
        Self {
            client,
            registry,
            country_suffix: CountrySuffix::default(),
            verify_alignment: false,
        }
    }

    /// Build the client and load the registry from config.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = OpenMeteoClient::new(config)?;
        let registry = CityRegistry::load(config.cities_file.as_deref())?;

        Ok(Self::new(client, registry)
            .with_country_suffix(config.country_suffix)
            .with_alignment_check(config.verify_alignment))
    }

    /// Set search-result name formatting.
    pub fn with_country_suffix(mut self, suffix: CountrySuffix) -> Self {
        self.country_suffix = suffix;
        self
    }

    /// Enable or disable bulk alignment warnings.
    pub fn with_alignment_check(mut self, enabled: bool) -> Self {
        self.verify_alignment = enabled;
        self
    }
}

/// Query string for `/api/search`.
#[derive(Debug, Default, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text place name.
    pub q: Option<String>,
}

impl SearchParams {
    /// Build from raw query pairs. The first `q` wins when the key repeats.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self {
            q: pairs
                .into_iter()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Current US AQI for every configured city.
#[utoipa::path(
    get,
    path = "/api/aqi",
    tag = "aqi",
    responses(
        (status = 200, description = "One entry per city, in registry order", body = [AqiResult]),
        (status = 500, description = "Upstream request failed", body = ErrorBody)
    )
)]
pub async fn city_aqi(State(state): State<AppState>) -> Result<Json<Vec<AqiResult>>, ApiError> {
    match fetch_city_aqi(&state.client, &state.registry, state.verify_alignment).await {
        Ok(results) => {
            metrics::inc_aqi_requests("ok");
            Ok(Json(results))
        }
        Err(e) => {
            error!("Error fetching AQI data: {}", e);
            metrics::inc_aqi_requests("error");
            Err(e.into())
        }
    }
}

/// Geocode a place name and return its current US AQI.
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "aqi",
    params(SearchParams),
    responses(
        (status = 200, description = "Resolved location with AQI", body = AqiResult),
        (status = 400, description = "Query missing or empty", body = ErrorBody),
        (status = 404, description = "No geocoding match", body = ErrorBody),
        (status = 500, description = "Upstream request failed", body = ErrorBody)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<AqiResult>, ApiError> {
    let params = SearchParams::from_pairs(pairs);
    match search_location(&state.client, params.q.as_deref(), state.country_suffix).await {
        Ok(result) => {
            metrics::inc_search_requests("ok");
            Ok(Json(result))
        }
        Err(e) => {
            match &e {
                ApiError::Upstream(_) => error!("Search error: {}", e),
                _ => info!(query = ?params.q, "Search rejected: {}", e),
            }
            metrics::inc_search_requests(search_outcome(&e));
            Err(e)
        }
    }
}

fn search_outcome(error: &ApiError) -> &'static str {
    match error {
        ApiError::MissingQuery => "missing_query",
        ApiError::LocationNotFound => "not_found",
        ApiError::Upstream(_) => "error",
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: "aqi-map",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}
