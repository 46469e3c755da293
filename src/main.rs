use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use roadwatch::api::AppState;
use roadwatch::config::LocationMode;
use roadwatch::{
    Clients, FixedLocationProvider, LocationProvider, OpenCageClient, OpenWeatherClient,
    OsrmClient, RoadwatchConfig, Session, browser_channel, logging, web,
};

/// Map of local weather, accident hotspots and the driving route to a searched place.
#[derive(Parser, Debug)]
#[command(name = "roadwatch", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        RoadwatchConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    logging::init(&config.logging)?;
    info!("Starting Roadwatch v{}", roadwatch::VERSION);

    if config.weather.credential().is_none() {
        warn!("No OpenWeatherMap API key configured; weather requests will fail");
    }
    if config.geocoding.credential().is_none() {
        warn!("No OpenCage API key configured; searches will fail");
    }

    let (location, reporter): (Arc<dyn LocationProvider>, _) = match config.location.mode {
        LocationMode::Browser => {
            let (provider, reporter) = browser_channel();
            let provider: Arc<dyn LocationProvider> = Arc::new(provider);
            (provider, Some(Arc::new(reporter)))
        }
        LocationMode::Fixed => {
            let position = config.location.fixed_position()?;
            info!("Using fixed location {}", position.format_coordinates());
            let provider: Arc<dyn LocationProvider> =
                Arc::new(FixedLocationProvider::new(Ok(position)));
            (provider, None)
        }
    };

    let clients = Clients {
        location,
        geocoding: Arc::new(OpenCageClient::new(&config.geocoding)?),
        weather: Arc::new(OpenWeatherClient::new(&config.weather)?),
        routing: Arc::new(OsrmClient::new(&config.routing)?),
    };

    let (session, handle) = Session::new(clients, config.map.default_center()?, config.map.zoom)?;
    tokio::spawn(session.run());

    let state = AppState {
        session: handle,
        location: reporter,
    };
    web::run(&config.server, state).await?;

    Ok(())
}
