//! The single application state aggregate

use serde::{Deserialize, Serialize};

use super::{Coordinate, RoutePoint, WeatherSnapshot};

/// Center used when no configuration overrides it
pub const DEFAULT_CENTER: Coordinate = Coordinate::from_degrees(51.505, -0.09);

/// Everything the map and panels render from.
///
/// Only `AppController` mutates this; views receive clones.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApplicationState {
    pub center: Coordinate,
    pub user_location: Option<Coordinate>,
    pub weather: Option<WeatherSnapshot>,
    pub destination: Option<RoutePoint>,
    /// Message of the latest failed operation, cleared by any later success
    pub error: Option<String>,
}

impl ApplicationState {
    #[must_use]
    pub fn new(center: Coordinate) -> Self {
        Self {
            center,
            user_location: None,
            weather: None,
            destination: None,
            error: None,
        }
    }

    /// Origin and destination of the route to draw, when both are known
    #[must_use]
    pub fn route_endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        match (self.user_location, &self.destination) {
            (Some(origin), Some(destination)) => Some((origin, destination.coordinate)),
            _ => None,
        }
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = ApplicationState::default();
        assert_eq!(state.center, DEFAULT_CENTER);
        assert!(state.user_location.is_none());
        assert!(state.error.is_none());
        assert!(state.route_endpoints().is_none());
    }

    #[test]
    fn test_route_endpoints_need_both_ends() {
        let mut state = ApplicationState::default();
        state.user_location = Some(Coordinate::from_degrees(51.5, -0.09));
        assert!(state.route_endpoints().is_none());

        state.destination = Some(RoutePoint {
            coordinate: Coordinate::from_degrees(48.8566, 2.3522),
            name: "Paris".to_string(),
        });
        assert_eq!(
            state.route_endpoints(),
            Some((
                Coordinate::from_degrees(51.5, -0.09),
                Coordinate::from_degrees(48.8566, 2.3522)
            ))
        );
    }
}
