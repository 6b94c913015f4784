//! Contract types for the risk tier capability.

use crate::core::activity::ActivityTier;
use serde::{Deserialize, Serialize};

/// Probabilistic risk category returned by a tier classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "low-risk")]
    LowRisk,
    #[serde(rename = "medium-risk")]
    MediumRisk,
    #[serde(rename = "high-risk")]
    HighRisk,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::LowRisk => "low-risk",
            RiskTier::MediumRisk => "medium-risk",
            RiskTier::HighRisk => "high-risk",
        }
    }

    /// Whether this tier triggers the activity-adjusted forecast.
    pub fn is_elevated(&self) -> bool {
        matches!(self, RiskTier::MediumRisk | RiskTier::HighRisk)
    }

    /// Title-cased label, e.g. "Medium Risk".
    pub fn title(&self) -> &'static str {
        match self {
            RiskTier::LowRisk => "Low Risk",
            RiskTier::MediumRisk => "Medium Risk",
            RiskTier::HighRisk => "High Risk",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far the probability sits from the decision region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

/// Inputs handed to a tier classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierQuery {
    pub age: u32,
    pub bmi: f64,
    pub activity_level: ActivityTier,
}

/// Output of a tier classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskTierResult {
    /// Probability of the positive class, in [0, 1]
    pub probability: f64,
    #[serde(rename = "risk_level")]
    pub tier: RiskTier,
    pub confidence: Confidence,
}

/// Probability cut-offs for tier and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Probabilities below this are low-risk
    pub medium_risk: f64,
    /// Probabilities at or above this are high-risk
    pub high_risk: f64,
    /// Confidence is high below this probability
    pub confidence_low: f64,
    /// Confidence is high above this probability
    pub confidence_high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium_risk: 0.3,
            high_risk: 0.6,
            confidence_low: 0.2,
            confidence_high: 0.8,
        }
    }
}

impl TierThresholds {
    pub fn tier(&self, probability: f64) -> RiskTier {
        if probability < self.medium_risk {
            RiskTier::LowRisk
        } else if probability < self.high_risk {
            RiskTier::MediumRisk
        } else {
            RiskTier::HighRisk
        }
    }

    pub fn confidence(&self, probability: f64) -> Confidence {
        if probability < self.confidence_low || probability > self.confidence_high {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    /// Build a full result from a raw probability.
    pub fn classify(&self, probability: f64) -> RiskTierResult {
        RiskTierResult {
            probability,
            tier: self.tier(probability),
            confidence: self.confidence(probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_cutoffs() {
        let t = TierThresholds::default();
        assert_eq!(t.tier(0.0), RiskTier::LowRisk);
        assert_eq!(t.tier(0.299), RiskTier::LowRisk);
        assert_eq!(t.tier(0.3), RiskTier::MediumRisk);
        assert_eq!(t.tier(0.599), RiskTier::MediumRisk);
        assert_eq!(t.tier(0.6), RiskTier::HighRisk);
        assert_eq!(t.tier(1.0), RiskTier::HighRisk);
    }

    #[test]
    fn test_confidence_cutoffs() {
        let t = TierThresholds::default();
        assert_eq!(t.confidence(0.1), Confidence::High);
        assert_eq!(t.confidence(0.2), Confidence::Medium);
        assert_eq!(t.confidence(0.8), Confidence::Medium);
        assert_eq!(t.confidence(0.81), Confidence::High);
    }

    #[test]
    fn test_serialized_names() {
        let result = TierThresholds::default().classify(0.45);
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["risk_level"], "medium-risk");
        assert_eq!(json["confidence"], "medium");
        assert!(RiskTier::HighRisk.is_elevated());
        assert!(!RiskTier::LowRisk.is_elevated());
    }
}
