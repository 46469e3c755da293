//! Accident hotspot reference data model

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Historical risk classification of a hotspot
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Visual severity tier a risk level renders as
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Severe,
    Elevated,
    Moderate,
}

impl RiskLevel {
    #[must_use]
    pub fn severity(self) -> SeverityTier {
        match self {
            RiskLevel::High => SeverityTier::Severe,
            RiskLevel::Medium => SeverityTier::Elevated,
            RiskLevel::Low => SeverityTier::Moderate,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

/// A location with elevated historical accident counts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccidentHotspot {
    pub id: u32,
    pub location: String,
    pub coordinate: Coordinate,
    pub risk_level: RiskLevel,
    pub accident_count: u32,
    /// Mitigations, most important first
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RiskLevel::High, SeverityTier::Severe)]
    #[case(RiskLevel::Medium, SeverityTier::Elevated)]
    #[case(RiskLevel::Low, SeverityTier::Moderate)]
    fn test_risk_level_severity(#[case] level: RiskLevel, #[case] tier: SeverityTier) {
        assert_eq!(level.severity(), tier);
    }

    #[test]
    fn test_severity_wire_format() {
        assert_eq!(
            serde_json::to_string(&SeverityTier::Elevated).unwrap(),
            "\"elevated\""
        );
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"High\"");
    }
}
