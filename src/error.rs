//! Unified error types for the air-quality service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Top-level error type for startup and CLI paths.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// City registry could not be loaded.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Upstream call failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Metrics recorder installation failed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// City registry loading errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The registry document is not a list of cities.
    #[error("failed to parse city list: {0}")]
    Parse(#[from] serde_json::Error),

    /// The registry contains no cities.
    #[error("city list is empty")]
    Empty,
}

/// Failures talking to the geocoding or air-quality upstreams.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure (connect, timeout, TLS, body read).
    #[error("request to {endpoint} failed: {source}")]
    Request {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// Status code received.
        status: StatusCode,
    },

    /// Upstream body was not the JSON we expected.
    #[error("failed to decode {endpoint} response: {reason}")]
    Decode {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// Decoder message.
        reason: String,
    },
}

/// Errors surfaced to HTTP clients as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// `q` missing or empty.
    #[error("No query provided")]
    MissingQuery,

    /// Geocoder returned no match.
    #[error("Location not found")]
    LocationNotFound,

    /// Either upstream failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    /// HTTP status for this failure class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::LocationNotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
