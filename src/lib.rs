//! `Roadwatch` - local weather, accident hotspots and driving routes on a map
//!
//! The browser page only renders. Location, geocoding, weather and routing
//! are orchestrated by a [`Session`] that owns the single application state
//! and publishes a complete [`SessionView`] after every change.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod geocoding;
pub mod hotspots;
pub mod location;
pub mod logging;
pub mod map_view;
pub mod models;
pub mod provider;
pub mod routing;
pub mod session;
pub mod ticket;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::RoadwatchConfig;
pub use controller::{AppController, Effect};
pub use error::{GeocodeError, LocationError, RoadwatchError, RouteError, WeatherError};
pub use geocoding::{GeocodingClient, OpenCageClient};
pub use hotspots::{HOTSPOTS, HotspotCard, HotspotPanel};
pub use location::{
    BrowserLocationProvider, FixedLocationProvider, LocationProvider, LocationReporter,
    browser_channel,
};
pub use map_view::{MapScene, MapView};
pub use models::{
    AccidentHotspot, ApplicationState, Coordinate, RiskLevel, RoutePoint, RouteResult,
    WeatherSnapshot,
};
pub use routing::{OsrmClient, RoutingClient};
pub use session::{Clients, Session, SessionHandle, SessionView};
pub use weather::{OpenWeatherClient, WeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RoadwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
