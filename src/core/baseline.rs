//! Age-based baseline diabetes risk.
//!
//! Prevalence anchors are age-band midpoints from the Australian Bureau of
//! Statistics diabetes release (2022), averaged across sexes. Ages between
//! anchors are linearly interpolated; ages past the last anchor follow the
//! last segment's slope.

use crate::core::round_to;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};

/// Age-band midpoints (years).
const ANCHOR_AGES: [f64; 5] = [22.0, 49.5, 59.5, 69.5, 80.0];

/// Prevalence (%) at each anchor age.
const ANCHOR_RISKS: [f64; 5] = [1.1, 5.65, 11.15, 13.8, 18.95];

/// Oldest supported age.
pub const MAX_AGE: f64 = 120.0;

/// Years past the last anchor at which extrapolation stops growing.
const EXTRAPOLATION_SPAN: f64 = 40.0;

/// Coarse category for a baseline percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineCategory {
    Low,
    Moderate,
    High,
}

impl BaselineCategory {
    pub fn from_percentage(risk: f64) -> Self {
        if risk < 3.0 {
            BaselineCategory::Low
        } else if risk < 10.0 {
            BaselineCategory::Moderate
        } else {
            BaselineCategory::High
        }
    }
}

/// Baseline risk together with the survey band an age falls into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeGroupInfo {
    pub age: f64,
    pub risk_percentage: f64,
    pub risk_category: BaselineCategory,
    pub age_group: String,
}

/// Piecewise-linear baseline risk model.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineRiskModel;

impl BaselineRiskModel {
    pub fn new() -> Self {
        Self
    }

    /// Slope of the final anchor segment, used past the last anchor.
    fn tail_slope() -> f64 {
        let n = ANCHOR_AGES.len();
        (ANCHOR_RISKS[n - 1] - ANCHOR_RISKS[n - 2]) / (ANCHOR_AGES[n - 1] - ANCHOR_AGES[n - 2])
    }

    /// Highest value the model can return.
    pub fn ceiling() -> f64 {
        ANCHOR_RISKS[ANCHOR_RISKS.len() - 1] + Self::tail_slope() * EXTRAPOLATION_SPAN
    }

    /// Baseline risk percentage for `age`, rounded to 2 decimals.
    pub fn baseline_risk(&self, age: f64) -> Result<f64> {
        if !age.is_finite() || age < 0.0 {
            return Err(RiskError::invalid("Age cannot be negative"));
        }
        if age > MAX_AGE {
            return Err(RiskError::invalid("Age must be realistic (<= 120 years)"));
        }

        let last = ANCHOR_AGES.len() - 1;
        let risk = if age < ANCHOR_AGES[0] {
            ANCHOR_RISKS[0]
        } else if age <= ANCHOR_AGES[last] {
            interpolate(age)
        } else {
            ANCHOR_RISKS[last] + Self::tail_slope() * (age - ANCHOR_AGES[last])
        };

        Ok(round_to(risk.min(Self::ceiling()), 2))
    }

    /// Baseline risk plus the survey age band and a coarse category.
    pub fn age_group_info(&self, age: f64) -> Result<AgeGroupInfo> {
        let risk = self.baseline_risk(age)?;

        let age_group = if age < 45.0 {
            "0-44"
        } else if age < 55.0 {
            "45-54"
        } else if age < 65.0 {
            "55-64"
        } else if age < 75.0 {
            "65-74"
        } else {
            "75+"
        };

        Ok(AgeGroupInfo {
            age,
            risk_percentage: risk,
            risk_category: BaselineCategory::from_percentage(risk),
            age_group: age_group.to_string(),
        })
    }
}

/// Linear interpolation between the bracketing anchors. `age` must lie
/// within the anchor range.
fn interpolate(age: f64) -> f64 {
    for i in 0..ANCHOR_AGES.len() - 1 {
        let (x0, x1) = (ANCHOR_AGES[i], ANCHOR_AGES[i + 1]);
        if age <= x1 {
            let (y0, y1) = (ANCHOR_RISKS[i], ANCHOR_RISKS[i + 1]);
            return y0 + (y1 - y0) * (age - x0) / (x1 - x0);
        }
    }
    ANCHOR_RISKS[ANCHOR_RISKS.len() - 1]
}

/// Convenience wrapper over [`BaselineRiskModel::baseline_risk`].
pub fn baseline_risk(age: f64) -> Result<f64> {
    BaselineRiskModel::new().baseline_risk(age)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_below_first_anchor() {
        assert_eq!(baseline_risk(0.0).unwrap(), 1.1);
        assert_eq!(baseline_risk(18.0).unwrap(), 1.1);
        assert_eq!(baseline_risk(22.0).unwrap(), 1.1);
    }

    #[test]
    fn test_anchor_values_exact() {
        for (age, risk) in ANCHOR_AGES.iter().zip(ANCHOR_RISKS.iter()) {
            assert_eq!(baseline_risk(*age).unwrap(), *risk);
        }
    }

    #[test]
    fn test_interpolation() {
        // 1.1 + 4.55 * 3 / 27.5
        assert_eq!(baseline_risk(25.0).unwrap(), 1.6);
        // midway between 49.5 and 59.5
        assert_eq!(baseline_risk(54.5).unwrap(), 8.4);
        assert_eq!(baseline_risk(45.0).unwrap(), 4.91);
    }

    #[test]
    fn test_extrapolation_beyond_last_anchor() {
        let at_90 = baseline_risk(90.0).unwrap();
        assert!((at_90 - 23.85).abs() < 0.01);

        let ceiling = BaselineRiskModel::ceiling();
        for age in 80..=120 {
            // rounding to 2 decimals may nudge the value past the raw ceiling
            assert!(baseline_risk(age as f64).unwrap() <= ceiling + 0.005);
        }
    }

    #[test]
    fn test_non_decreasing_over_supported_ages() {
        let mut previous = 0.0;
        for age in 0..=120 {
            let risk = baseline_risk(age as f64).unwrap();
            assert!(risk >= previous, "risk dropped at age {age}");
            previous = risk;
        }
    }

    #[test]
    fn test_out_of_range_age() {
        assert!(matches!(baseline_risk(-1.0), Err(RiskError::InvalidInput(_))));
        assert!(matches!(baseline_risk(121.0), Err(RiskError::InvalidInput(_))));
        assert!(baseline_risk(f64::NAN).is_err());
    }

    #[test]
    fn test_age_group_info() {
        let model = BaselineRiskModel::new();

        let info = model.age_group_info(30.0).unwrap();
        assert_eq!(info.age_group, "0-44");
        assert_eq!(info.risk_category, BaselineCategory::Low);

        let info = model.age_group_info(58.0).unwrap();
        assert_eq!(info.age_group, "55-64");
        assert_eq!(info.risk_category, BaselineCategory::High);

        let info = model.age_group_info(82.0).unwrap();
        assert_eq!(info.age_group, "75+");
    }
}
