//! Data models for the Roadwatch application
//!
//! This module contains the core domain models organized by concern:
//! - Coordinate: geographic points in (latitude, longitude) order
//! - Weather: current-conditions snapshots
//! - Route: search destinations and driving routes
//! - Hotspot: static accident reference data
//! - State: the application state aggregate

pub mod coordinate;
pub mod hotspot;
pub mod route;
pub mod state;
pub mod weather;

// Re-export all public types for convenient access
pub use coordinate::Coordinate;
pub use hotspot::{AccidentHotspot, RiskLevel, SeverityTier};
pub use route::{RoutePoint, RouteResult};
pub use state::{ApplicationState, DEFAULT_CENTER};
pub use weather::WeatherSnapshot;
