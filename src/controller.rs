//! Application controller
//!
//! `AppController` owns the [`ApplicationState`] and is the only thing that
//! mutates it. Every transition is a named method that updates the state in
//! one step and returns the [`Effect`]s the caller must carry out. The
//! controller itself performs no I/O, which keeps every transition testable
//! without a network.

use tracing::{debug, info, warn};

use crate::error::{GeocodeError, LocationError, WeatherError};
use crate::models::{ApplicationState, Coordinate, RoutePoint, WeatherSnapshot};
use crate::ticket::{RequestCounter, Ticket};

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the location provider for the current position
    RequestLocation { ticket: Ticket },
    /// Resolve a search query
    Geocode { ticket: Ticket, query: String },
    /// Fetch current weather for the new center
    FetchWeather { ticket: Ticket, coordinate: Coordinate },
}

pub struct AppController {
    default_center: Coordinate,
    state: ApplicationState,
    location_requests: RequestCounter,
    geocode_requests: RequestCounter,
    weather_requests: RequestCounter,
}

impl AppController {
    #[must_use]
    pub fn new(default_center: Coordinate) -> Self {
        Self {
            default_center,
            state: ApplicationState::new(default_center),
            location_requests: RequestCounter::new(),
            geocode_requests: RequestCounter::new(),
            weather_requests: RequestCounter::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// Init, run each time a page mounts: back to the default state and
    /// ask for the user's position again. Outstanding requests are superseded.
    pub fn mount(&mut self) -> Vec<Effect> {
        info!("Page mounted, requesting location");
        self.state = ApplicationState::new(self.default_center);
        self.geocode_requests.invalidate();
        self.weather_requests.invalidate();
        vec![Effect::RequestLocation {
            ticket: self.location_requests.issue(),
        }]
    }

    pub fn location_resolved(&mut self, ticket: Ticket, coordinate: Coordinate) -> Vec<Effect> {
        if !self.location_requests.is_current(ticket) {
            debug!("Discarding location from an earlier mount");
            return Vec::new();
        }
        info!("Location resolved: {}", coordinate.format_coordinates());
        self.state.user_location = Some(coordinate);
        self.state.center = coordinate;
        self.state.error = None;
        vec![self.fetch_weather(coordinate)]
    }

    /// The map keeps its current (default) center. Returns whether the failure was applied.
    pub fn location_failed(&mut self, ticket: Ticket, error: LocationError) -> bool {
        if !self.location_requests.is_current(ticket) {
            debug!("Discarding location failure from an earlier mount: {}", error);
            return false;
        }
        warn!("Location request failed: {}", error);
        self.state.error = Some(error.user_message());
        true
    }

    /// Accepted in any state. Blank queries are ignored without a request.
    pub fn submit_search(&mut self, query: &str) -> Vec<Effect> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search");
            return Vec::new();
        }
        vec![Effect::Geocode {
            ticket: self.geocode_requests.issue(),
            query: query.to_string(),
        }]
    }

    pub fn geocode_resolved(
        &mut self,
        ticket: Ticket,
        query: String,
        coordinate: Coordinate,
    ) -> Vec<Effect> {
        if !self.geocode_requests.is_current(ticket) {
            debug!("Discarding superseded geocode result for '{}'", query);
            return Vec::new();
        }
        info!("'{}' resolved to {}", query, coordinate.format_coordinates());
        self.state.destination = Some(RoutePoint {
            coordinate,
            name: query,
        });
        self.state.center = coordinate;
        self.state.error = None;
        vec![self.fetch_weather(coordinate)]
    }

    /// Returns whether the failure was applied.
    pub fn geocode_failed(&mut self, ticket: Ticket, error: &GeocodeError) -> bool {
        if !self.geocode_requests.is_current(ticket) {
            debug!("Discarding superseded geocode failure: {}", error);
            return false;
        }
        warn!("Geocoding failed: {}", error);
        self.state.error = Some(error.user_message());
        true
    }

    /// Replaces the snapshot wholesale. Returns whether it was applied.
    pub fn weather_resolved(&mut self, ticket: Ticket, snapshot: WeatherSnapshot) -> bool {
        if !self.weather_requests.is_current(ticket) {
            debug!("Discarding superseded weather for {}", snapshot.location_name);
            return false;
        }
        self.state.weather = Some(snapshot);
        self.state.error = None;
        true
    }

    /// Any previous snapshot is kept. Returns whether the failure was applied.
    pub fn weather_failed(&mut self, ticket: Ticket, error: &WeatherError) -> bool {
        if !self.weather_requests.is_current(ticket) {
            debug!("Discarding superseded weather failure: {}", error);
            return false;
        }
        warn!("Weather fetch failed: {}", error);
        self.state.error = Some(error.user_message());
        true
    }

    fn fetch_weather(&mut self, coordinate: Coordinate) -> Effect {
        Effect::FetchWeather {
            ticket: self.weather_requests.issue(),
            coordinate,
        }
    }
}
