//! Air-quality map backend entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aqi_map::api::{create_router, AppState};
use aqi_map::aqi::{fetch_city_aqi, search_location};
use aqi_map::config::{Config, LogFormat};
use aqi_map::metrics;
use aqi_map::registry::CityRegistry;
use aqi_map::upstream::OpenMeteoClient;
use aqi_map::utils::shutdown_signal;

/// Air-quality map backend.
#[derive(Parser, Debug)]
#[command(name = "aqi-map")]
#[command(about = "Serves current US AQI for a fixed set of cities and ad-hoc location search")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// List the configured cities.
    Cities,

    /// Fetch current AQI for all cities once and print it.
    Aqi,

    /// Search a location once and print its AQI.
    Search {
        /// Place name to look up.
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config, args.verbose);

    // Handle subcommands
    match args.command {
        Some(Command::Serve { port }) => cmd_serve(config, port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Cities) => cmd_cities(&config),
        Some(Command::Aqi) => cmd_aqi(&config).await,
        Some(Command::Search { query }) => cmd_search(&config, &query).await,
        None => cmd_serve(config, args.port).await,
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose || config.verbose {
        EnvFilter::new("aqi_map=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Run the HTTP server until shutdown.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if config.metrics_enabled {
        metrics::init_metrics()?;
    }

    let state = AppState::from_config(&config)?;
    info!("Loaded {} cities", state.registry.len());
    info!("Geocoding upstream: {}", state.client.geocoding_url());
    info!("Air-quality upstream: {}", state.client.air_quality_url());

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("HTTP server listening on http://{}", listener.local_addr()?);

    let router = create_router(state, &config.static_dir);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("AQI MAP - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Loading city registry... ");
    let registry = match CityRegistry::load(config.cities_file.as_deref()) {
        Ok(r) => {
            println!("OK");
            r
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("City registry load failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen: {}:{}", config.host, config.port);
    println!("  Geocoding URL: {}", config.geocoding_url);
    println!("  Air-quality URL: {}", config.air_quality_url);
    match config.http_timeout_ms {
        Some(ms) => println!("  HTTP Timeout: {}ms", ms),
        None => println!("  HTTP Timeout: client default"),
    }
    match &config.cities_file {
        Some(path) => println!("  Cities: {} (from {})", registry.len(), path.display()),
        None => println!("  Cities: {} (built-in)", registry.len()),
    }
    println!("  Static Dir: {}", config.static_dir.display());
    println!("  Country Suffix: {}", config.country_suffix);
    println!("  Verify Alignment: {}", config.verify_alignment);
    println!("  Log Format: {}", config.log_format);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// List the configured cities.
fn cmd_cities(config: &Config) -> anyhow::Result<()> {
    let registry = CityRegistry::load(config.cities_file.as_deref())?;

    println!("{:<4} {:<20} {:>10} {:>11}", "#", "City", "Lat", "Lon");
    for (i, city) in registry.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:>10.4} {:>11.4}",
            i + 1,
            city.name,
            city.latitude,
            city.longitude
        );
    }

    Ok(())
}

/// Fetch current AQI for every city once.
async fn cmd_aqi(config: &Config) -> anyhow::Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let client = OpenMeteoClient::new(config)?;
    let registry = CityRegistry::load(config.cities_file.as_deref())?;

    let results = fetch_city_aqi(&client, &registry, config.verify_alignment).await?;

    if results.is_empty() {
        println!("No AQI results (upstream response was not a list)");
        return Ok(());
    }

    println!("{:<20} {:>6}", "City", "US AQI");
    for result in &results {
        let aqi = result
            .aqi
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<20} {:>6}", result.name, aqi);
    }

    Ok(())
}

/// Look up one location.
async fn cmd_search(config: &Config, query: &str) -> anyhow::Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let client = OpenMeteoClient::new(config)?;
    let result = search_location(&client, Some(query), config.country_suffix).await?;

    println!("Location: {}", result.name);
    println!("Coordinates: {:.4}, {:.4}", result.latitude, result.longitude);
    match result.aqi {
        Some(aqi) => println!("US AQI: {}", aqi),
        None => println!("US AQI: unavailable"),
    }

    Ok(())
}
