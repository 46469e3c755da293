//! Weather snapshot model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at one place, replaced wholesale on every fetch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Provider's name for the observed place
    pub location_name: String,
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Apparent temperature in Celsius
    pub feels_like_c: f64,
    /// Relative humidity in percent
    pub humidity_pct: u32,
    /// Condition group, e.g. "Clouds"
    pub condition_main: String,
    /// Condition detail, e.g. "broken clouds"
    pub condition_description: String,
    /// Provider icon identifier, e.g. "04d"
    pub icon_id: String,
    /// When the snapshot was received
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Format temperature rounded to whole degrees
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature_c.round() as i64)
    }

    #[must_use]
    pub fn format_feels_like(&self) -> String {
        format!("{}°C", self.feels_like_c.round() as i64)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{}%", self.humidity_pct)
    }

    #[must_use]
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}.png", self.icon_id)
    }
}
