//! Map view reconciliation and scene rendering
//!
//! `MapView` derives everything the map surface draws from the application
//! state plus the route it fetched itself. Routes follow last-request-wins:
//! whenever the `(origin, destination)` pair changes by value the current
//! route is cleared and a new request is issued, and completions for older
//! pairs are dropped.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::RoadwatchError;
use crate::config::MAX_ZOOM;
use crate::error::RouteError;
use crate::models::{ApplicationState, Coordinate, RouteResult, WeatherSnapshot};
use crate::ticket::{RequestCounter, Ticket};

const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const USER_LOCATION_LABEL: &str = "Your Location";

/// A route fetch the runtime must perform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub ticket: Ticket,
    pub origin: Coordinate,
    pub destination: Coordinate,
}

/// Visible region of the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: &'static str,
    pub attribution: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    UserLocation,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinate,
    pub label: Option<String>,
    pub popup: Option<WeatherPopup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub distance: String,
    pub duration: String,
}

/// Weather details shown on the center marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPopup {
    pub location_name: String,
    pub icon_url: String,
    pub description: String,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub route: Option<RouteSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    /// `[latitude, longitude]` pairs
    pub points: Vec<[f64; 2]>,
    pub color: &'static str,
    pub weight: u8,
    pub opacity: f32,
}

/// Everything the page needs to draw the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub viewport: Viewport,
    pub tiles: TileLayer,
    pub markers: Vec<Marker>,
    pub polyline: Option<Polyline>,
}

pub struct MapView {
    initial_zoom: u8,
    zoom: u8,
    route_requests: RequestCounter,
    endpoints: Option<(Coordinate, Coordinate)>,
    route: Option<RouteResult>,
}

impl MapView {
    pub fn new(zoom: u8) -> crate::Result<Self> {
        let mut view = Self {
            initial_zoom: 0,
            zoom: 0,
            route_requests: RequestCounter::new(),
            endpoints: None,
            route: None,
        };
        view.set_zoom(zoom)?;
        view.initial_zoom = zoom;
        Ok(view)
    }

    /// Back to the initial zoom for a freshly mounted page
    pub fn reset_zoom(&mut self) {
        self.zoom = self.initial_zoom;
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Remember the zoom the user chose; re-centering never changes it
    pub fn set_zoom(&mut self, zoom: u8) -> crate::Result<()> {
        if zoom > MAX_ZOOM {
            return Err(RoadwatchError::validation(format!(
                "zoom {zoom} exceeds the maximum of {MAX_ZOOM}"
            )));
        }
        self.zoom = zoom;
        Ok(())
    }

    #[must_use]
    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    /// Compare the state's route endpoints with the last ones seen.
    ///
    /// On change the current route is cleared, outstanding requests are
    /// superseded and, when both endpoints are known, a new request returned.
    pub fn reconcile(&mut self, state: &ApplicationState) -> Option<RouteRequest> {
        let endpoints = state.route_endpoints();
        if endpoints == self.endpoints {
            return None;
        }

        self.endpoints = endpoints;
        self.route = None;

        match endpoints {
            Some((origin, destination)) => {
                let ticket = self.route_requests.issue();
                debug!(
                    "Route endpoints changed to {} -> {}",
                    origin.format_coordinates(),
                    destination.format_coordinates()
                );
                Some(RouteRequest {
                    ticket,
                    origin,
                    destination,
                })
            }
            None => {
                // a remount dropped the endpoints
                self.route_requests.invalidate();
                None
            }
        }
    }

    /// Apply a route completion. Returns whether it was current.
    pub fn route_resolved(&mut self, ticket: Ticket, route: RouteResult) -> bool {
        if !self.route_requests.is_current(ticket) {
            debug!("Discarding route for superseded endpoints");
            return false;
        }
        info!(
            "Route ready: {} / {}",
            route.format_distance(),
            route.format_duration()
        );
        self.route = Some(route);
        true
    }

    /// Routing failures only degrade the map; they are logged, never surfaced.
    pub fn route_failed(&mut self, ticket: Ticket, error: &RouteError) {
        if self.route_requests.is_current(ticket) {
            warn!("Error fetching route: {}", error);
        } else {
            debug!("Ignoring failure of superseded route request: {}", error);
        }
    }

    /// Render the scene for the given state
    #[must_use]
    pub fn scene(&self, state: &ApplicationState) -> MapScene {
        let mut markers = Vec::new();

        if let Some(user_location) = state.user_location {
            markers.push(Marker {
                kind: MarkerKind::UserLocation,
                position: user_location,
                label: Some(USER_LOCATION_LABEL.to_string()),
                popup: None,
            });
        }

        if let Some(weather) = &state.weather {
            markers.push(Marker {
                kind: MarkerKind::Center,
                position: state.center,
                label: None,
                popup: Some(self.weather_popup(weather)),
            });
        }

        let polyline = self
            .route
            .as_ref()
            .filter(|route| !route.polyline.is_empty())
            .map(|route| Polyline {
                points: route.polyline.iter().map(|c| c.to_lat_lon()).collect(),
                color: "blue",
                weight: 4,
                opacity: 0.6,
            });

        MapScene {
            viewport: Viewport {
                center: state.center,
                zoom: self.zoom,
            },
            tiles: TileLayer {
                url_template: TILE_URL_TEMPLATE,
                attribution: TILE_ATTRIBUTION,
            },
            markers,
            polyline,
        }
    }

    fn weather_popup(&self, weather: &WeatherSnapshot) -> WeatherPopup {
        WeatherPopup {
            location_name: weather.location_name.clone(),
            icon_url: weather.icon_url(),
            description: weather.condition_description.clone(),
            temperature: weather.format_temperature(),
            feels_like: weather.format_feels_like(),
            humidity: weather.format_humidity(),
            route: self.route.as_ref().map(|route| RouteSummary {
                distance: route.format_distance(),
                duration: route.format_duration(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoutePoint;
    use chrono::Utc;

    const LONDON: Coordinate = Coordinate::from_degrees(51.5, -0.09);
    const PARIS: Coordinate = Coordinate::from_degrees(48.8566, 2.3522);
    const BERLIN: Coordinate = Coordinate::from_degrees(52.52, 13.405);

    fn state_with(user: Option<Coordinate>, destination: Option<Coordinate>) -> ApplicationState {
        let mut state = ApplicationState::default();
        state.user_location = user;
        state.destination = destination.map(|coordinate| RoutePoint {
            coordinate,
            name: "somewhere".to_string(),
        });
        if let Some(center) = destination.or(user) {
            state.center = center;
        }
        state
    }

    fn route_to(destination: Coordinate) -> RouteResult {
        RouteResult::from_provider_units(vec![LONDON, destination], 10_000.0, 600.0)
    }

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: "Paris".to_string(),
            temperature_c: 20.6,
            feels_like_c: 19.4,
            humidity_pct: 55,
            condition_main: "Clear".to_string(),
            condition_description: "clear sky".to_string(),
            icon_id: "01d".to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_cleared_endpoints_drop_route_and_pending_request() {
        let mut view = MapView::new(13).unwrap();
        let first = view.reconcile(&state_with(Some(LONDON), Some(PARIS))).unwrap();
        assert!(view.route_resolved(first.ticket, route_to(PARIS)));
        let pending = view.reconcile(&state_with(Some(LONDON), Some(BERLIN))).unwrap();

        assert!(view.reconcile(&ApplicationState::default()).is_none());
        assert!(view.route().is_none());
        assert!(!view.route_resolved(pending.ticket, route_to(BERLIN)));
        assert!(view.scene(&ApplicationState::default()).polyline.is_none());
    }

    #[test]
    fn test_reset_zoom() {
        let mut view = MapView::new(13).unwrap();
        view.set_zoom(17).unwrap();
        view.reset_zoom();
        assert_eq!(view.zoom(), 13);
    }

    #[test]
    fn test_no_request_until_both_endpoints_known() {
        let mut view = MapView::new(13).unwrap();
        assert!(view.reconcile(&state_with(None, None)).is_none());
        assert!(view.reconcile(&state_with(Some(LONDON), None)).is_none());
        assert!(view.reconcile(&state_with(None, Some(PARIS))).is_none());

        let request = view.reconcile(&state_with(Some(LONDON), Some(PARIS))).unwrap();
        assert_eq!(request.origin, LONDON);
        assert_eq!(request.destination, PARIS);
    }

    #[test]
    fn test_unchanged_endpoints_do_not_refetch() {
        let mut view = MapView::new(13).unwrap();
        let state = state_with(Some(LONDON), Some(PARIS));
        let request = view.reconcile(&state).unwrap();
        assert!(view.route_resolved(request.ticket, route_to(PARIS)));

        assert!(view.reconcile(&state.clone()).is_none());
        assert!(view.route().is_some());
    }

    #[test]
    fn test_stale_route_is_discarded() {
        let mut view = MapView::new(13).unwrap();
        let first = view.reconcile(&state_with(Some(LONDON), Some(PARIS))).unwrap();
        let second = view.reconcile(&state_with(Some(LONDON), Some(BERLIN))).unwrap();

        assert!(view.route_resolved(second.ticket, route_to(BERLIN)));
        assert!(!view.route_resolved(first.ticket, route_to(PARIS)));
        assert_eq!(view.route(), Some(&route_to(BERLIN)));
    }

    #[test]
    fn test_changed_endpoints_clear_previous_route() {
        let mut view = MapView::new(13).unwrap();
        let first = view.reconcile(&state_with(Some(LONDON), Some(PARIS))).unwrap();
        view.route_resolved(first.ticket, route_to(PARIS));

        assert!(view.reconcile(&state_with(Some(LONDON), Some(BERLIN))).is_some());
        assert!(view.route().is_none());
        assert!(view.scene(&state_with(Some(LONDON), Some(BERLIN))).polyline.is_none());
    }

    #[test]
    fn test_failed_route_leaves_map_without_polyline() {
        let mut view = MapView::new(13).unwrap();
        let request = view.reconcile(&state_with(Some(LONDON), Some(PARIS))).unwrap();
        view.route_failed(request.ticket, &RouteError::ProviderFailure("down".into()));

        let scene = view.scene(&state_with(Some(LONDON), Some(PARIS)));
        assert!(scene.polyline.is_none());
        assert_eq!(scene.markers.len(), 1);
    }

    #[test]
    fn test_polyline_points_are_lat_lon() {
        let mut view = MapView::new(13).unwrap();
        let state = state_with(Some(LONDON), Some(PARIS));
        let request = view.reconcile(&state).unwrap();
        let route = RouteResult::from_provider_units(
            [[-0.09, 51.5], [2.3522, 48.8566]]
                .into_iter()
                .map(Coordinate::from_lon_lat)
                .collect(),
            1.0,
            1.0,
        );
        view.route_resolved(request.ticket, route);

        let polyline = view.scene(&state).polyline.unwrap();
        assert_eq!(polyline.points, vec![[51.5, -0.09], [48.8566, 2.3522]]);
    }

    #[test]
    fn test_scene_markers_and_popup() {
        let mut view = MapView::new(13).unwrap();
        let mut state = state_with(Some(LONDON), Some(PARIS));
        state.weather = Some(weather());

        let scene = view.scene(&state);
        assert_eq!(scene.markers.len(), 2);
        assert_eq!(scene.markers[0].kind, MarkerKind::UserLocation);
        assert_eq!(scene.markers[0].label.as_deref(), Some("Your Location"));
        let popup = scene.markers[1].popup.clone().unwrap();
        assert_eq!(scene.markers[1].position, PARIS);
        assert_eq!(popup.temperature, "21°C");
        assert_eq!(popup.feels_like, "19°C");
        assert_eq!(popup.humidity, "55%");
        assert!(popup.route.is_none());

        let request = view.reconcile(&state).unwrap();
        view.route_resolved(request.ticket, route_to(PARIS));
        let popup = view.scene(&state).markers[1].popup.clone().unwrap();
        assert_eq!(
            popup.route,
            Some(RouteSummary {
                distance: "10.0 km".to_string(),
                duration: "10 min".to_string()
            })
        );
    }

    #[test]
    fn test_recenter_keeps_zoom() {
        let mut view = MapView::new(13).unwrap();
        view.set_zoom(7).unwrap();

        let scene = view.scene(&state_with(Some(LONDON), Some(PARIS)));
        assert_eq!(scene.viewport, Viewport { center: PARIS, zoom: 7 });

        let scene = view.scene(&state_with(Some(LONDON), Some(BERLIN)));
        assert_eq!(scene.viewport, Viewport { center: BERLIN, zoom: 7 });
    }

    #[test]
    fn test_zoom_is_validated() {
        let mut view = MapView::new(13).unwrap();
        assert!(view.set_zoom(20).is_err());
        assert_eq!(view.zoom(), 13);
        assert!(MapView::new(30).is_err());
    }
}
