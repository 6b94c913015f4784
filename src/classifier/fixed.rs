//! Fixed-probability tier classifier.
//!
//! Stands in for a trained model when only the pipeline's branching is of
//! interest (tests, demos, dry runs).

use crate::classifier::types::{RiskTierResult, TierQuery, TierThresholds};
use crate::classifier::TierClassifier;
use crate::error::{Result, RiskError};
use std::sync::atomic::{AtomicU64, Ordering};

/// Returns the same probability for every query.
#[derive(Debug)]
pub struct FixedTierClassifier {
    probability: f64,
    thresholds: TierThresholds,
    calls: AtomicU64,
}

impl FixedTierClassifier {
    pub fn new(probability: f64, thresholds: TierThresholds) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(RiskError::invalid(format!(
                "Probability must be within [0, 1], got {probability}"
            )));
        }
        Ok(Self {
            probability,
            thresholds,
            calls: AtomicU64::new(0),
        })
    }

    /// Number of predictions served so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl TierClassifier for FixedTierClassifier {
    fn predict_tier(&self, _query: &TierQuery) -> Result<RiskTierResult> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.thresholds.classify(self.probability))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::types::RiskTier;
    use crate::core::activity::ActivityTier;

    #[test]
    fn test_fixed_probability() {
        let classifier = FixedTierClassifier::new(0.7, TierThresholds::default()).unwrap();
        let query = TierQuery {
            age: 58,
            bmi: 31.2,
            activity_level: ActivityTier::Low,
        };

        let result = classifier.predict_tier(&query).unwrap();
        assert_eq!(result.tier, RiskTier::HighRisk);
        assert_eq!(result.probability, 0.7);
        assert_eq!(classifier.calls(), 1);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        assert!(FixedTierClassifier::new(1.5, TierThresholds::default()).is_err());
        assert!(FixedTierClassifier::new(-0.1, TierThresholds::default()).is_err());
    }
}
