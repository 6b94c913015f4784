//! Activity tier classification from a daily step history.
//!
//! Days outside a plausible range are treated as wear or sensor errors and
//! dropped. The tier is taken from the median of the surviving days, which
//! tolerates sporadic sick, travel or device-fault days far better than the
//! mean does.

use crate::core::round_to;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Below this the device was most likely not worn.
pub const MIN_VALID_STEPS: i64 = 100;

/// Above this the reading is treated as a device error.
pub const MAX_VALID_STEPS: i64 = 50_000;

/// Upper bound (inclusive) of the low tier.
pub const LOW_TIER_MAX: f64 = 6_000.0;

/// Upper bound (inclusive) of the moderate tier.
pub const MODERATE_TIER_MAX: f64 = 10_000.0;

/// Activity tier derived from median daily steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityTier {
    Low,
    Moderate,
    High,
}

impl ActivityTier {
    /// Tier for a daily step figure. Boundary values belong to the lower tier.
    pub fn from_steps(steps: f64) -> Self {
        if steps <= LOW_TIER_MAX {
            ActivityTier::Low
        } else if steps <= MODERATE_TIER_MAX {
            ActivityTier::Moderate
        } else {
            ActivityTier::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityTier::Low => "low",
            ActivityTier::Moderate => "moderate",
            ActivityTier::High => "high",
        }
    }
}

impl std::fmt::Display for ActivityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Robust summary of a step history.
///
/// Only `tier` (from the median) drives later decisions; the remaining
/// statistics are reported for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    #[serde(rename = "activity_level")]
    pub tier: ActivityTier,
    /// Median of valid days, rounded to 1 decimal
    pub median_steps: f64,
    /// Mean of valid days, rounded to 1 decimal
    pub mean_steps: f64,
    pub total_days: usize,
    pub valid_days: usize,
    pub outliers_removed: usize,
    pub min_steps: i64,
    pub max_steps: i64,
}

/// Median-based activity classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityClassifier;

impl ActivityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a step history of any non-zero length.
    pub fn classify(&self, steps: &[i64]) -> Result<ActivitySummary> {
        if steps.is_empty() {
            return Err(RiskError::invalid("Steps list cannot be empty"));
        }
        if steps.iter().any(|&s| s < 0) {
            return Err(RiskError::invalid("Steps cannot be negative"));
        }

        let valid: Vec<i64> = steps
            .iter()
            .copied()
            .filter(|s| (MIN_VALID_STEPS..=MAX_VALID_STEPS).contains(s))
            .collect();

        if valid.is_empty() {
            return Err(RiskError::invalid(
                "No valid step data after filtering outliers",
            ));
        }

        let median = median_of(&valid);
        let mean = valid.iter().map(|&s| s as f64).mean();

        // min/max exist: `valid` is non-empty
        let min_steps = valid.iter().copied().min().unwrap_or_default();
        let max_steps = valid.iter().copied().max().unwrap_or_default();

        Ok(ActivitySummary {
            tier: ActivityTier::from_steps(median),
            median_steps: round_to(median, 1),
            mean_steps: round_to(mean, 1),
            total_days: steps.len(),
            valid_days: valid.len(),
            outliers_removed: steps.len() - valid.len(),
            min_steps,
            max_steps,
        })
    }
}

/// Median of a non-empty sample, averaging the middle pair for even counts.
///
/// Computed on the integers directly so the boundary comparisons against
/// the tier limits are exact.
fn median_of(values: &[i64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    } else {
        sorted[n / 2] as f64
    }
}

/// Convenience wrapper over [`ActivityClassifier::classify`].
pub fn classify_activity(steps: &[i64]) -> Result<ActivitySummary> {
    ActivityClassifier::new().classify(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat(pattern: &[i64], times: usize, tail: &[i64]) -> Vec<i64> {
        let mut out = Vec::new();
        for _ in 0..times {
            out.extend_from_slice(pattern);
        }
        out.extend_from_slice(tail);
        out
    }

    #[test]
    fn test_tier_boundaries_belong_to_lower_tier() {
        assert_eq!(ActivityTier::from_steps(6000.0), ActivityTier::Low);
        assert_eq!(ActivityTier::from_steps(6000.5), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_steps(10000.0), ActivityTier::Moderate);
        assert_eq!(ActivityTier::from_steps(10001.0), ActivityTier::High);
    }

    #[test]
    fn test_constant_history() {
        let summary = classify_activity(&[3500; 28]).unwrap();
        assert_eq!(summary.tier, ActivityTier::Low);
        assert_eq!(summary.median_steps, 3500.0);
        assert_eq!(summary.mean_steps, 3500.0);
        assert_eq!(summary.valid_days, 28);
        assert_eq!(summary.outliers_removed, 0);
    }

    #[test]
    fn test_even_count_median_averages_middle_pair() {
        let summary = classify_activity(&[6000, 6001, 2000, 9000]).unwrap();
        assert_eq!(summary.median_steps, 6000.5);
        assert_eq!(summary.tier, ActivityTier::Moderate);
    }

    #[test]
    fn test_outliers_are_dropped() {
        let steps = repeat(&[8000, 8500, 7500, 9000, 8200], 5, &[0, 75000, 50]);
        let summary = classify_activity(&steps).unwrap();

        assert_eq!(summary.total_days, 28);
        assert_eq!(summary.valid_days, 25);
        assert_eq!(summary.outliers_removed, 3);
        assert_eq!(summary.min_steps, 7500);
        assert_eq!(summary.max_steps, 9000);
        assert_eq!(summary.tier, ActivityTier::Moderate);
    }

    #[test]
    fn test_median_resists_sick_days() {
        let steps = repeat(&[8000, 8500, 7500, 9000, 8200], 5, &[800, 1200, 900]);
        let summary = classify_activity(&steps).unwrap();
        assert_eq!(summary.median_steps, 8200.0);
        assert_eq!(summary.tier, ActivityTier::Moderate);
        assert!(summary.mean_steps < summary.median_steps);
    }

    #[test]
    fn test_median_straddling_boundary_is_exact() {
        let summary = classify_activity(&[5999, 6001]).unwrap();
        assert_eq!(summary.median_steps, 6000.0);
        assert_eq!(summary.tier, ActivityTier::Low);
    }

    #[test]
    fn test_median_invariant_to_order() {
        let steps: Vec<i64> = (0..28).map(|i| 3000 + (i * 397) % 9000).collect();
        let mut reversed = steps.clone();
        reversed.reverse();
        let mut sorted = steps.clone();
        sorted.sort_unstable();

        let a = classify_activity(&steps).unwrap();
        let b = classify_activity(&reversed).unwrap();
        let c = classify_activity(&sorted).unwrap();
        assert_eq!(a.median_steps, b.median_steps);
        assert_eq!(a.median_steps, c.median_steps);
        assert_eq!(a.tier, c.tier);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            classify_activity(&[]),
            Err(RiskError::InvalidInput(_))
        ));
        assert!(matches!(
            classify_activity(&[5000, -1]),
            Err(RiskError::InvalidInput(_))
        ));
        assert!(matches!(
            classify_activity(&[0, 50, 60000]),
            Err(RiskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        let summary = classify_activity(&[12000; 28]).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["activity_level"], "high");
        assert_eq!(json["median_steps"], 12000.0);
    }
}
