//! Travel-Proxy-RS: a REST proxy over the Amadeus travel APIs
//!
//! This is the main entry point for the application.

use anyhow::{bail, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use travel_proxy::{
    config,
    network::HttpClient,
    providers::Amadeus,
    web::{create_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    let Some(config_path) = parse_args()? else {
        return Ok(());
    };

    // Load configuration
    let settings_path = config::locate(config_path.as_deref());
    let settings = config::load(settings_path.as_deref())?;

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting Travel-Proxy-RS v{}", travel_proxy::VERSION);
    match &settings_path {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }
    info!(
        "Loaded configuration for instance: {}",
        settings.general.instance_name
    );

    if settings.amadeus.has_credentials() {
        info!("Amadeus credentials configured ({})", settings.amadeus.base_url);
    } else {
        warn!("AMADEUS_API_KEY or AMADEUS_API_SECRET is not set; upstream calls will fail");
    }

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let amadeus = Amadeus::new(client, &settings.amadeus)?;
    info!(
        "Multi-destination search over {} destinations",
        settings.search.destinations.len()
    );

    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    // Create application state and router
    let state = AppState::new(settings, amadeus);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);
    info!("API endpoint: http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse command line arguments.
///
/// Returns `None` when the process should exit after printing help or version.
fn parse_args() -> Result<Option<Option<PathBuf>>> {
    let mut config_path = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => bail!("{} requires a file path", arg),
            },
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("travel-proxy-rs {}", travel_proxy::VERSION);
                return Ok(None);
            }
            other => bail!("unknown argument: {} (see --help)", other),
        }
    }

    Ok(Some(config_path))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
Travel-Proxy-RS v{}
A REST proxy over the Amadeus travel APIs

USAGE:
    travel-proxy-rs [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    TRAVEL_PROXY_SETTINGS_PATH  Path to settings.yml
    TRAVEL_PROXY_DEBUG          Enable debug mode (true/false)
    TRAVEL_PROXY_BIND_ADDRESS   Bind address
    PORT                        Server port
    AMADEUS_API_KEY             Amadeus client id
    AMADEUS_API_SECRET          Amadeus client secret
    AMADEUS_BASE_URL            Amadeus API base URL
    RUST_LOG                    Log filter (default: info)
"#,
        travel_proxy::VERSION
    );
}
