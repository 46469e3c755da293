//! Driving route client for an OSRM server
//!
//! OSRM speaks GeoJSON, which orders positions `(longitude, latitude)`. Both
//! the request path and the returned geometry are converted here so nothing
//! outside this module ever sees that ordering.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::RoutingConfig;
use crate::error::{ROUTE_FAILED_MESSAGE, RouteError};
use crate::models::{Coordinate, RouteResult};
use crate::provider;

/// Computes a driving route between two coordinates
#[async_trait]
pub trait RoutingClient: Send + Sync {
    async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, RouteError>;
}

/// Routing client backed by OSRM's `route/v1/driving` service
pub struct OsrmClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: Option<String>,
    #[serde(default)]
    routes: Vec<RouteResponse>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    geometry: GeometryResponse,
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct GeometryResponse {
    coordinates: Vec<[f64; 2]>,
}

impl From<RouteResponse> for RouteResult {
    fn from(route: RouteResponse) -> Self {
        let polyline = route
            .geometry
            .coordinates
            .into_iter()
            .map(Coordinate::from_lon_lat)
            .collect();
        RouteResult::from_provider_units(polyline, route.distance, route.duration)
    }
}

impl OsrmClient {
    pub fn new(config: &RoutingConfig) -> crate::Result<Self> {
        Ok(Self {
            client: provider::http_client()?,
            base_url: config.base_url.clone(),
        })
    }

    fn request_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        let [origin_lon, origin_lat] = origin.to_lon_lat();
        let [destination_lon, destination_lat] = destination.to_lon_lat();
        format!(
            "{}/{},{};{},{}?overview=full&geometries=geojson",
            provider::join(&self.base_url, "route/v1/driving"),
            origin_lon,
            origin_lat,
            destination_lon,
            destination_lat
        )
    }
}

#[async_trait]
impl RoutingClient for OsrmClient {
    #[instrument(skip(self))]
    async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, RouteError> {
        debug!("Calling the routing API");
        let response = self
            .client
            .get(self.request_url(origin, destination))
            .send()
            .await
            .map_err(|e| RouteError::ProviderFailure(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RouteError::ProviderFailure(e.to_string()))?;

        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();
        if parsed.as_ref().and_then(|r| r.code.as_deref()) == Some("NoRoute") {
            return Err(RouteError::NoRoute);
        }

        if !status.is_success() {
            let message = provider::message_from_body(&body)
                .unwrap_or_else(|| format!("{ROUTE_FAILED_MESSAGE} (HTTP {status})"));
            return Err(RouteError::ProviderFailure(message));
        }

        let parsed = parsed.ok_or_else(|| {
            RouteError::ProviderFailure("Invalid route data received from provider".to_string())
        })?;

        parsed
            .routes
            .into_iter()
            .next()
            .map(RouteResult::from)
            .ok_or(RouteError::NoRoute)
    }
}
