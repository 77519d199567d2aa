//! HTTP API: the AQI and search endpoints plus health, metrics and docs.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{api_router, create_router, ApiDoc};
