//! Validated pipeline input.

use crate::core::projection::WINDOW_DAYS;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};

pub const MIN_BMI: f64 = 10.0;
pub const MAX_BMI: f64 = 60.0;
pub const MAX_PROFILE_AGE: i64 = 120;

/// Raw request shape as it arrives from a caller.
///
/// `past_28_day_steps` is accepted as an alias so payloads from older
/// clients still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInput {
    pub age: i64,
    pub bmi: f64,
    #[serde(alias = "past_28_day_steps")]
    pub steps: Vec<i64>,
}

/// Age, BMI and 28 days of step counts. Only constructible through
/// [`AgeBmiStepProfile::new`], so holding one means the input is valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBmiStepProfile {
    age: u32,
    bmi: f64,
    steps: Vec<i64>,
}

impl AgeBmiStepProfile {
    pub fn new(age: i64, bmi: f64, steps: Vec<i64>) -> Result<Self> {
        if !(0..=MAX_PROFILE_AGE).contains(&age) {
            return Err(RiskError::invalid("Age must be between 0 and 120 years"));
        }
        if !bmi.is_finite() || !(MIN_BMI..=MAX_BMI).contains(&bmi) {
            return Err(RiskError::invalid("BMI must be between 10 and 60"));
        }
        if steps.len() != WINDOW_DAYS {
            return Err(RiskError::invalid(format!(
                "Step history must contain exactly {WINDOW_DAYS} values, got {}",
                steps.len()
            )));
        }
        if steps.iter().any(|&s| s < 0) {
            return Err(RiskError::invalid("Step counts cannot be negative"));
        }

        Ok(Self {
            age: age as u32,
            bmi,
            steps,
        })
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn steps(&self) -> &[i64] {
        &self.steps
    }
}

impl TryFrom<ProfileInput> for AgeBmiStepProfile {
    type Error = RiskError;

    fn try_from(input: ProfileInput) -> Result<Self> {
        Self::new(input.age, input.bmi, input.steps)
    }
}
