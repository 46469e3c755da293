//! Configuration management for the `Roadwatch` application
//!
//! Handles loading configuration from files and environment variables,
//! and validates all configuration settings. Provider credentials are
//! deliberately not validated here: a missing key degrades the matching
//! feature at request time instead of stopping the process.

use crate::RoadwatchError;
use crate::models::Coordinate;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Value shipped in sample `.env` files; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Highest zoom level served by the OpenStreetMap tile layer
pub const MAX_ZOOM: u8 = 19;

/// Root configuration structure for the `Roadwatch` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadwatchConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Weather provider settings
    pub weather: WeatherConfig,
    /// Geocoding provider settings
    pub geocoding: GeocodingConfig,
    /// Routing provider settings
    pub routing: RoutingConfig,
    /// Where the initial user position comes from
    pub location: LocationConfig,
    /// Map defaults
    pub map: MapConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the static page
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the current-weather endpoint
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Geocoding API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// OpenCage API key
    pub api_key: Option<String>,
    /// Base URL for the forward geocoding endpoint
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// Routing API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of the OSRM server
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,
}

/// Source of the initial user position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Wait for the page to report the browser's position
    #[default]
    Browser,
    /// Use the configured coordinates
    Fixed,
}

/// Initial position settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub mode: LocationMode,
    /// Latitude used in `fixed` mode
    pub latitude: Option<f64>,
    /// Longitude used in `fixed` mode
    pub longitude: Option<f64>,
}

/// Map defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Latitude shown before any position is known
    #[serde(default = "default_center_latitude")]
    pub default_latitude: f64,
    /// Longitude shown before any position is known
    #[serde(default = "default_center_longitude")]
    pub default_longitude: f64,
    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_assets_dir() -> String {
    "frontend".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://api.opencagedata.com/geocode/v1".to_string()
}

fn default_routing_base_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_center_latitude() -> f64 {
    51.505
}

fn default_center_longitude() -> f64 {
    -0.09
}

fn default_zoom() -> u8 {
    13
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            assets_dir: default_assets_dir(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_base_url(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: default_center_latitude(),
            default_longitude: default_center_longitude(),
            zoom: default_zoom(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Returns the key only when it is present, non-empty and not the placeholder.
#[must_use]
pub fn usable_credential(api_key: Option<&str>) -> Option<&str> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
}

impl WeatherConfig {
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        usable_credential(self.api_key.as_deref())
    }
}

impl GeocodingConfig {
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        usable_credential(self.api_key.as_deref())
    }
}

impl MapConfig {
    /// Center shown until geolocation or a search resolves
    pub fn default_center(&self) -> crate::Result<Coordinate> {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }
}

impl LocationConfig {
    /// Coordinates for `fixed` mode, if both halves are configured and valid
    pub fn fixed_position(&self) -> crate::Result<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude),
            _ => Err(RoadwatchError::config(
                "Fixed location mode requires both location.latitude and location.longitude",
            )),
        }
    }
}

impl RoadwatchConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. ROADWATCH_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("ROADWATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: RoadwatchConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roadwatch").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_locations()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(RoadwatchError::config("Server port cannot be 0").into());
        }

        if self.map.zoom > MAX_ZOOM {
            return Err(
                RoadwatchError::config(format!("Map zoom cannot exceed {MAX_ZOOM}")).into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RoadwatchError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RoadwatchError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Geocoding", &self.geocoding.base_url),
            ("Routing", &self.routing.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RoadwatchError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_locations(&self) -> Result<()> {
        self.map
            .default_center()
            .with_context(|| "Invalid map default center")?;

        if self.location.mode == LocationMode::Fixed {
            self.location.fixed_position()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = RoadwatchConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.weather.base_url,
            "https://api.openweathermap.org/data/2.5"
        );
        assert_eq!(config.routing.base_url, "https://router.project-osrm.org");
        assert_eq!(config.map.zoom, 13);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.location.mode, LocationMode::Browser);
        assert!(config.weather.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    #[case(Some("YOUR_API_KEY"), None)]
    #[case(Some("abc123"), Some("abc123"))]
    fn test_usable_credential(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(usable_credential(raw), expected);
    }

    #[test]
    fn test_missing_credentials_are_not_fatal() {
        let mut config = RoadwatchConfig::default();
        config.weather.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        assert!(config.validate().is_ok());
        assert!(config.weather.credential().is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = RoadwatchConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_zoom_range() {
        let mut config = RoadwatchConfig::default();
        config.map.zoom = 25;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("zoom cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = RoadwatchConfig::default();
        config.routing.base_url = "router.project-osrm.org".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Routing API base URL"));
    }

    #[test]
    fn test_fixed_mode_requires_coordinates() {
        let mut config = RoadwatchConfig::default();
        config.location.mode = LocationMode::Fixed;
        assert!(config.validate().is_err());

        config.location.latitude = Some(11.0168);
        config.location.longitude = Some(76.9558);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("roadwatch-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[map]\nzoom = 11\n\n[geocoding]\napi_key = \"from-file\"\n",
        )
        .unwrap();

        let config = RoadwatchConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.map.zoom, 11);
        assert_eq!(config.geocoding.credential(), Some("from-file"));
        assert_eq!(config.logging.format, "pretty");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = RoadwatchConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("roadwatch"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
