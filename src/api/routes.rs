//! HTTP API route definitions.

use std::path::Path;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, city_aqi, health, metrics_text, search, AppState};
use crate::aqi::AqiResult;
use crate::error::ErrorBody;

/// OpenAPI document for the JSON endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::city_aqi, handlers::search),
    components(schemas(AqiResult, ErrorBody)),
    tags((name = "aqi", description = "Current US air-quality lookups"))
)]
pub struct ApiDoc;

/// Create the application router.
///
/// Anything not matched by an API route is served from `static_dir`, so
/// `/` resolves to `static_dir/index.html`.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    api_router()
        // Health endpoints
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        // API documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Page assets
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON API routes only.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/aqi", get(city_aqi))
        .route("/api/search", get(search))
}
