//! Forward geocoding client for the OpenCage API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::error::{GEOCODING_FAILED_MESSAGE, GeocodeError};
use crate::models::Coordinate;
use crate::provider;

/// Resolves a free-text place name to a coordinate
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// The provider's first candidate wins; no re-ranking happens here.
    async fn geocode(&self, query: &str) -> Result<Coordinate, GeocodeError>;
}

/// Geocoding client backed by OpenCage's `/json` endpoint
pub struct OpenCageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    geometry: Geometry,
    #[serde(default)]
    formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

impl OpenCageClient {
    pub fn new(config: &GeocodingConfig) -> crate::Result<Self> {
        Ok(Self {
            client: provider::http_client()?,
            base_url: config.base_url.clone(),
            api_key: config.credential().map(ToString::to_string),
        })
    }

    fn request_url(&self, query: &str, api_key: &str) -> String {
        format!(
            "{}?q={}&key={}",
            provider::join(&self.base_url, "json"),
            urlencoding::encode(query),
            urlencoding::encode(api_key)
        )
    }
}

#[async_trait]
impl GeocodingClient for OpenCageClient {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Coordinate, GeocodeError> {
        if query.trim().is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Geocoding API key is missing or a placeholder; not issuing request");
            return Err(GeocodeError::Misconfigured);
        };

        info!("Geocoding location: '{}'", query);

        let response = self
            .client
            .get(self.request_url(query, api_key))
            .send()
            .await
            .map_err(|e| {
                error!("Geocoding request failed: {}", e);
                GeocodeError::ProviderFailure(GEOCODING_FAILED_MESSAGE.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = provider::error_message(response)
                .await
                .unwrap_or_else(|| GEOCODING_FAILED_MESSAGE.to_string());
            warn!("Geocoding provider returned {}: {}", status, message);
            return Err(GeocodeError::ProviderFailure(message));
        }

        let body: GeocodingResponse = response.json().await.map_err(|e| {
            error!("Failed to parse geocoding response for '{}': {}", query, e);
            GeocodeError::ProviderFailure(GEOCODING_FAILED_MESSAGE.to_string())
        })?;

        let Some(first) = body.results.into_iter().next() else {
            warn!("No results found for location '{}'", query);
            return Err(GeocodeError::NoResults);
        };

        debug!(
            "Using first result {:?} at ({}, {})",
            first.formatted, first.geometry.lat, first.geometry.lng
        );

        Coordinate::new(first.geometry.lat, first.geometry.lng).map_err(|e| {
            error!("Geocoding provider returned an invalid coordinate: {}", e);
            GeocodeError::ProviderFailure(GEOCODING_FAILED_MESSAGE.to_string())
        })
    }
}
