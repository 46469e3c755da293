//! Destination and driving route models

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A resolved search destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoutePoint {
    pub coordinate: Coordinate,
    /// The query the user searched for
    pub name: String,
}

/// A driving route between the user and the destination
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteResult {
    /// Path in `(latitude, longitude)` order
    pub polyline: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_min: u32,
}

impl RouteResult {
    /// Build from provider units (meters, seconds)
    #[must_use]
    pub fn from_provider_units(polyline: Vec<Coordinate>, meters: f64, seconds: f64) -> Self {
        let minutes = (seconds.max(0.0) / 60.0).round();
        Self {
            polyline,
            distance_km: meters.max(0.0) / 1000.0,
            duration_min: minutes.min(f64::from(u32::MAX)) as u32,
        }
    }

    #[must_use]
    pub fn format_distance(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }

    #[must_use]
    pub fn format_duration(&self) -> String {
        format!("{} min", self.duration_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_units() {
        let route = RouteResult::from_provider_units(Vec::new(), 12_345.0, 1_290.0);
        assert_eq!(route.distance_km, 12.345);
        assert_eq!(route.duration_min, 22);
        assert_eq!(route.format_distance(), "12.3 km");
        assert_eq!(route.format_duration(), "22 min");
    }

    #[test]
    fn test_duration_rounds_to_nearest_minute() {
        assert_eq!(RouteResult::from_provider_units(Vec::new(), 0.0, 89.0).duration_min, 1);
        assert_eq!(RouteResult::from_provider_units(Vec::new(), 0.0, 90.0).duration_min, 2);
        assert_eq!(RouteResult::from_provider_units(Vec::new(), 0.0, 29.0).duration_min, 0);
    }
}
