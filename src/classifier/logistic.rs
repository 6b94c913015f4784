//! Logistic tier classifier backed by a portable JSON model.
//!
//! Features are the standardized age and BMI plus a one-hot encoding of the
//! activity tier, in the same layout the model was exported with:
//!
//! ```json
//! {
//!   "name": "diabetes-tier-logistic",
//!   "version": "2024-06",
//!   "intercept": -1.2,
//!   "coefficients": {
//!     "age": 0.9, "bmi": 0.7,
//!     "activity_low": 0.5, "activity_moderate": 0.0, "activity_high": -0.4
//!   },
//!   "scaler": {
//!     "age": { "mean": 47.0, "std": 15.0 },
//!     "bmi": { "mean": 28.0, "std": 5.5 }
//!   }
//! }
//! ```

use crate::classifier::types::{RiskTierResult, TierQuery, TierThresholds};
use crate::classifier::TierClassifier;
use crate::core::activity::ActivityTier;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Standardization parameters for one numeric feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: f64,
    pub std: f64,
}

impl FeatureScaler {
    fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub age: f64,
    pub bmi: f64,
    pub activity_low: f64,
    pub activity_moderate: f64,
    pub activity_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalers {
    pub age: FeatureScaler,
    pub bmi: FeatureScaler,
}

/// Serialized logistic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub intercept: f64,
    pub coefficients: Coefficients,
    pub scaler: Scalers,
}

impl LogisticModel {
    fn validate(&self) -> Result<()> {
        let scalers = [("age", self.scaler.age), ("bmi", self.scaler.bmi)];
        for (feature, scaler) in scalers {
            if !scaler.std.is_finite() || scaler.std <= 0.0 {
                return Err(RiskError::external(format!(
                    "Model '{}' has a non-positive std for feature '{feature}'",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Probability of the positive class.
    pub fn probability(&self, query: &TierQuery) -> f64 {
        let c = &self.coefficients;
        let activity = match query.activity_level {
            ActivityTier::Low => c.activity_low,
            ActivityTier::Moderate => c.activity_moderate,
            ActivityTier::High => c.activity_high,
        };

        let z = self.intercept
            + c.age * self.scaler.age.transform(f64::from(query.age))
            + c.bmi * self.scaler.bmi.transform(query.bmi)
            + activity;

        1.0 / (1.0 + (-z).exp())
    }
}

/// Tier classifier evaluating a [`LogisticModel`].
#[derive(Debug, Clone)]
pub struct LogisticTierClassifier {
    model: LogisticModel,
    thresholds: TierThresholds,
}

impl LogisticTierClassifier {
    pub fn new(model: LogisticModel, thresholds: TierThresholds) -> Result<Self> {
        model.validate()?;
        Ok(Self { model, thresholds })
    }

    pub fn from_json(json: &str, thresholds: TierThresholds) -> Result<Self> {
        let model: LogisticModel = serde_json::from_str(json)
            .map_err(|e| RiskError::external(format!("Malformed tier model: {e}")))?;
        Self::new(model, thresholds)
    }

    pub fn from_path(path: &Path, thresholds: TierThresholds) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RiskError::external(format!("Failed to read tier model from {path:?}: {e}"))
        })?;
        Self::from_json(&json, thresholds)
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }
}

impl TierClassifier for LogisticTierClassifier {
    fn predict_tier(&self, query: &TierQuery) -> Result<RiskTierResult> {
        let probability = self.model.probability(query);
        if !probability.is_finite() {
            return Err(RiskError::external(format!(
                "Model '{}' produced a non-finite probability",
                self.model.name
            )));
        }
        // four decimals, matching what the model registry reports
        let probability = (probability * 10_000.0).round() / 10_000.0;
        Ok(self.thresholds.classify(probability))
    }

    fn name(&self) -> &str {
        &self.model.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::types::RiskTier;

    const MODEL: &str = r#"{
        "name": "test-logistic",
        "intercept": -0.5,
        "coefficients": {
            "age": 1.0, "bmi": 1.0,
            "activity_low": 0.5, "activity_moderate": 0.0, "activity_high": -0.5
        },
        "scaler": {
            "age": { "mean": 50.0, "std": 10.0 },
            "bmi": { "mean": 28.0, "std": 4.0 }
        }
    }"#;

    fn query(age: u32, bmi: f64, activity_level: ActivityTier) -> TierQuery {
        TierQuery {
            age,
            bmi,
            activity_level,
        }
    }

    #[test]
    fn test_probability_at_means() {
        let classifier = LogisticTierClassifier::from_json(MODEL, TierThresholds::default()).unwrap();
        // z = -0.5 + 0 + 0 + 0 for moderate activity at the feature means
        let p = classifier.model().probability(&query(50, 28.0, ActivityTier::Moderate));
        assert!((p - 0.3775).abs() < 1e-4);

        let result = classifier
            .predict_tier(&query(50, 28.0, ActivityTier::Moderate))
            .unwrap();
        assert_eq!(result.tier, RiskTier::MediumRisk);
        assert_eq!(result.probability, 0.3775);
    }

    #[test]
    fn test_activity_shifts_probability() {
        let classifier = LogisticTierClassifier::from_json(MODEL, TierThresholds::default()).unwrap();
        let low = classifier.predict_tier(&query(45, 26.0, ActivityTier::Low)).unwrap();
        let high = classifier.predict_tier(&query(45, 26.0, ActivityTier::High)).unwrap();
        assert!(low.probability > high.probability);
    }

    #[test]
    fn test_extremes_map_to_outer_tiers() {
        let classifier = LogisticTierClassifier::from_json(MODEL, TierThresholds::default()).unwrap();
        let young = classifier.predict_tier(&query(30, 19.0, ActivityTier::High)).unwrap();
        assert_eq!(young.tier, RiskTier::LowRisk);

        let older = classifier.predict_tier(&query(75, 38.0, ActivityTier::Low)).unwrap();
        assert_eq!(older.tier, RiskTier::HighRisk);
    }

    #[test]
    fn test_malformed_model_is_external_error() {
        let err = LogisticTierClassifier::from_json("{\"name\": 1}", TierThresholds::default())
            .unwrap_err();
        assert!(matches!(err, RiskError::ExternalCapability(_)));

        let zero_std = MODEL.replace("\"std\": 10.0", "\"std\": 0.0");
        assert!(LogisticTierClassifier::from_json(&zero_std, TierThresholds::default()).is_err());
    }
}
