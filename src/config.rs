//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;
use strum::{Display, EnumString};

/// How the search endpoint joins a place name with its country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CountrySuffix {
    /// Always `"<name>, <country>"`, even when the country is empty.
    #[default]
    Always,
    /// Drop the `", "` separator when the country is empty.
    WhenPresent,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server ===
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the page assets served at `/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    // === Upstreams ===
    /// Geocoding search endpoint.
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Air-quality endpoint.
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,

    /// Optional upstream request timeout. Unset leaves the client default.
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,

    // === Data ===
    /// JSON file with `[{name, lat, lon}]`. Unset uses the built-in list.
    #[serde(default)]
    pub cities_file: Option<PathBuf>,

    /// Name formatting for search results.
    #[serde(default)]
    pub country_suffix: CountrySuffix,

    /// Warn when bulk results do not line up with the requested coordinates.
    #[serde(default)]
    pub verify_alignment: bool,

    // === Observability ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_air_quality_url() -> String {
    "https://air-quality-api.open-meteo.com/v1/air-quality".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            geocoding_url: default_geocoding_url(),
            air_quality_url: default_air_quality_url(),
            http_timeout_ms: None,
            cities_file: None,
            country_suffix: CountrySuffix::default(),
            verify_alignment: false,
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
            verbose: false,
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("HOST must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        check_http_url("GEOCODING_URL", &self.geocoding_url)?;
        check_http_url("AIR_QUALITY_URL", &self.air_quality_url)?;

        if self.http_timeout_ms == Some(0) {
            return Err("HTTP_TIMEOUT_MS must be greater than 0 when set".to_string());
        }

        Ok(())
    }
}

fn check_http_url(var: &str, value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("{} is not a valid URL: {}", var, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{} must use http or https, got {}", var, other)),
    }
}
