//! Accident hotspot reference data and the hotspot panel
//!
//! The data set is static and never mutated at runtime.

use std::sync::LazyLock;

use serde::Serialize;

use crate::models::{AccidentHotspot, Coordinate, RiskLevel, SeverityTier};

const PANEL_TITLE: &str = "Accident Hotspots";

pub static HOTSPOTS: LazyLock<Vec<AccidentHotspot>> = LazyLock::new(|| {
    vec![
        hotspot(
            1,
            "Gandhipuram",
            Coordinate::from_degrees(11.0168, 76.9558),
            RiskLevel::High,
            45,
            &[
                "Install traffic signals",
                "Improve street lighting",
                "Add pedestrian crossings",
            ],
        ),
        hotspot(
            2,
            "Ukkadam",
            Coordinate::from_degrees(10.9925, 76.9608),
            RiskLevel::Medium,
            28,
            &[
                "Speed limit enforcement",
                "Road maintenance",
                "Add warning signs",
            ],
        ),
        hotspot(
            3,
            "RS Puram",
            Coordinate::from_degrees(11.0050, 76.9562),
            RiskLevel::High,
            38,
            &[
                "Traffic calming measures",
                "Improve intersection design",
                "Enhanced police patrolling",
            ],
        ),
    ]
});

fn hotspot(
    id: u32,
    location: &str,
    coordinate: Coordinate,
    risk_level: RiskLevel,
    accident_count: u32,
    recommendations: &[&str],
) -> AccidentHotspot {
    AccidentHotspot {
        id,
        location: location.to_string(),
        coordinate,
        risk_level,
        accident_count,
        recommendations: recommendations.iter().map(ToString::to_string).collect(),
    }
}

/// One rendered hotspot entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotCard {
    pub id: u32,
    pub location: String,
    pub risk_level: RiskLevel,
    pub severity: SeverityTier,
    pub badge: String,
    pub accident_summary: String,
    pub recommendations: Vec<String>,
    /// Straight-line distance from the user, once their position is known
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotPanel {
    pub title: &'static str,
    pub cards: Vec<HotspotCard>,
}

impl HotspotPanel {
    /// Render the hotspot list in its stored order
    #[must_use]
    pub fn render(hotspots: &[AccidentHotspot], user_location: Option<Coordinate>) -> Self {
        let cards = hotspots
            .iter()
            .map(|hotspot| HotspotCard {
                id: hotspot.id,
                location: hotspot.location.clone(),
                risk_level: hotspot.risk_level,
                severity: hotspot.risk_level.severity(),
                badge: format!("{} Risk", hotspot.risk_level.label()),
                accident_summary: format!("{} accidents reported", hotspot.accident_count),
                recommendations: hotspot.recommendations.clone(),
                distance_km: user_location.map(|user| user.distance_km(&hotspot.coordinate)),
            })
            .collect();

        Self {
            title: PANEL_TITLE,
            cards,
        }
    }
}
