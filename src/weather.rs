//! Current-weather client for the OpenWeatherMap API
//!
//! Units are fixed to metric. The credential is checked before a request is
//! built, so a missing key never reaches the network.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::{WEATHER_FAILED_MESSAGE, WeatherError};
use crate::models::{Coordinate, WeatherSnapshot};
use crate::provider;

/// Fetches current conditions for a coordinate
#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError>;
}

/// Weather client backed by OpenWeatherMap's `/weather` endpoint
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig) -> crate::Result<Self> {
        Ok(Self {
            client: provider::http_client()?,
            base_url: config.base_url.clone(),
            api_key: config.credential().map(ToString::to_string),
        })
    }

    fn request_url(&self, coordinate: Coordinate, api_key: &str) -> String {
        format!(
            "{}?lat={}&lon={}&units=metric&appid={}",
            provider::join(&self.base_url, "weather"),
            coordinate.latitude,
            coordinate.longitude,
            urlencoding::encode(api_key)
        )
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Weather API key is missing or a placeholder; not issuing request");
            return Err(WeatherError::Misconfigured);
        };

        info!(
            "Getting current weather for coordinates: {}",
            coordinate.format_coordinates()
        );

        let response = self
            .client
            .get(self.request_url(coordinate, api_key))
            .send()
            .await
            .map_err(|e| {
                error!("Weather request failed: {}", e);
                WeatherError::ProviderFailure(WEATHER_FAILED_MESSAGE.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = provider::error_message(response)
                .await
                .unwrap_or_else(|| WEATHER_FAILED_MESSAGE.to_string());
            warn!("Weather provider returned {}: {}", status, message);
            return Err(WeatherError::ProviderFailure(message));
        }

        let body: openweather::CurrentWeatherResponse = response.json().await.map_err(|e| {
            error!("Failed to parse weather response: {}", e);
            WeatherError::ProviderFailure(WEATHER_FAILED_MESSAGE.to_string())
        })?;

        let snapshot = body.into_snapshot().ok_or_else(|| {
            error!("Weather response has no condition entries");
            WeatherError::ProviderFailure(WEATHER_FAILED_MESSAGE.to_string())
        })?;

        debug!(
            "Weather for {}: {} ({})",
            snapshot.location_name,
            snapshot.format_temperature(),
            snapshot.condition_description
        );
        Ok(snapshot)
    }
}

/// OpenWeatherMap API response structures
mod openweather {
    use super::{Utc, WeatherSnapshot};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        #[serde(default)]
        pub name: String,
        pub main: MainBlock,
        #[serde(default)]
        pub weather: Vec<ConditionBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct ConditionBlock {
        pub main: String,
        pub description: String,
        pub icon: String,
    }

    impl CurrentWeatherResponse {
        /// The first condition entry is the primary one
        pub fn into_snapshot(self) -> Option<WeatherSnapshot> {
            let condition = self.weather.into_iter().next()?;
            Some(WeatherSnapshot {
                location_name: self.name,
                temperature_c: self.main.temp,
                feels_like_c: self.main.feels_like,
                humidity_pct: self.main.humidity,
                condition_main: condition.main,
                condition_description: condition.description,
                icon_id: condition.icon,
                fetched_at: Utc::now(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenWeatherClient {
        let config = WeatherConfig {
            api_key: api_key.map(ToString::to_string),
            base_url: server.uri(),
        };
        OpenWeatherClient::new(&config).unwrap()
    }

    fn london_body() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": -0.09, "lat": 51.5},
            "weather": [
                {"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"},
                {"id": 701, "main": "Mist", "description": "mist", "icon": "50d"}
            ],
            "main": {"temp": 14.6, "feels_like": 13.2, "temp_min": 12.0, "temp_max": 16.1, "pressure": 1012, "humidity": 81},
            "name": "London",
            "cod": 200
        })
    }

    #[tokio::test]
    async fn test_fetch_weather_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.09"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-key"));
        let snapshot = client
            .fetch_weather(Coordinate::from_degrees(51.5, -0.09))
            .await
            .unwrap();

        assert_eq!(snapshot.location_name, "London");
        assert_eq!(snapshot.temperature_c, 14.6);
        assert_eq!(snapshot.feels_like_c, 13.2);
        assert_eq!(snapshot.humidity_pct, 81);
        assert_eq!(snapshot.condition_main, "Clouds");
        assert_eq!(snapshot.condition_description, "broken clouds");
        assert_eq!(snapshot.icon_id, "04d");
    }

    #[tokio::test]
    async fn test_placeholder_key_issues_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("YOUR_API_KEY"));
        let result = client
            .fetch_weather(Coordinate::from_degrees(51.5, -0.09))
            .await;
        assert_eq!(result, Err(WeatherError::Misconfigured));

        let client = client_for(&server, None);
        let result = client
            .fetch_weather(Coordinate::from_degrees(51.5, -0.09))
            .await;
        assert_eq!(result, Err(WeatherError::Misconfigured));
    }

    #[tokio::test]
    async fn test_provider_message_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("wrong-key"));
        let err = client
            .fetch_weather(Coordinate::from_degrees(51.5, -0.09))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::ProviderFailure(ref m) if m.starts_with("Invalid API key")));
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-key"));
        let err = client
            .fetch_weather(Coordinate::from_degrees(51.5, -0.09))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WeatherError::ProviderFailure("Failed to fetch weather data".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_conditions_is_a_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": [],
                "main": {"temp": 1.0, "feels_like": 0.0, "humidity": 50},
                "name": "Nowhere"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-key"));
        let result = client
            .fetch_weather(Coordinate::from_degrees(0.0, 0.0))
            .await;
        assert!(matches!(result, Err(WeatherError::ProviderFailure(_))));
    }
}
