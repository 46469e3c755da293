//! Error types and handling for the `Roadwatch` application
//!
//! `RoadwatchError` covers process-level failures (configuration, I/O, HTTP
//! client construction). Each external capability has its own error enum so
//! the controller can decide which failures reach the user and which are
//! only logged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the `Roadwatch` application
#[derive(Error, Debug)]
pub enum RoadwatchError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// HTTP client construction errors
    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl RoadwatchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RoadwatchError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            RoadwatchError::Validation { message } => format!("Invalid input: {message}"),
            RoadwatchError::Http { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            RoadwatchError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            RoadwatchError::General { message } => message.clone(),
        }
    }
}

pub const LOCATION_FAILED_MESSAGE: &str =
    "Failed to get your location. Please search for a location manually.";
pub const WEATHER_MISCONFIGURED_MESSAGE: &str =
    "Please set up your OpenWeatherMap API key (ROADWATCH_WEATHER__API_KEY)";
pub const GEOCODING_MISCONFIGURED_MESSAGE: &str =
    "Please set up your Geocoding API key (ROADWATCH_GEOCODING__API_KEY)";
pub const WEATHER_FAILED_MESSAGE: &str = "Failed to fetch weather data";
pub const GEOCODING_FAILED_MESSAGE: &str = "Failed to geocode the location. Please try again.";
pub const NO_RESULTS_MESSAGE: &str = "No results found for the entered location";
pub const ROUTE_FAILED_MESSAGE: &str = "Failed to fetch route";

/// Failure reported by the device geolocation capability.
///
/// Serialized in `snake_case` so the page can forward the browser's
/// `GeolocationPositionError` as-is.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
}

impl LocationError {
    #[must_use]
    pub fn user_message(&self) -> String {
        LOCATION_FAILED_MESSAGE.to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Blank query; rejected before any request is built.
    #[error("geocoding query is empty")]
    EmptyQuery,
    #[error("no geocoding results")]
    NoResults,
    #[error("geocoding provider failure: {0}")]
    ProviderFailure(String),
    #[error("geocoding credential is missing or a placeholder")]
    Misconfigured,
}

impl GeocodeError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GeocodeError::EmptyQuery | GeocodeError::NoResults => NO_RESULTS_MESSAGE.to_string(),
            GeocodeError::ProviderFailure(message) => message.clone(),
            GeocodeError::Misconfigured => GEOCODING_MISCONFIGURED_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("weather provider failure: {0}")]
    ProviderFailure(String),
    #[error("weather credential is missing or a placeholder")]
    Misconfigured,
}

impl WeatherError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::ProviderFailure(message) => message.clone(),
            WeatherError::Misconfigured => WEATHER_MISCONFIGURED_MESSAGE.to_string(),
        }
    }
}

/// Routing failures are never shown to the user; the map simply has no polyline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route between the requested points")]
    NoRoute,
    #[error("routing provider failure: {0}")]
    ProviderFailure(String),
}
