//! Risk assessment output.
//!
//! This is the JSON contract consumed by the transport layer and the
//! recommendation generator. Field names and nesting are fixed.

use crate::classifier::types::RiskTier;
use crate::core::activity::{ActivitySummary, ActivityTier};
use crate::core::projection::Horizon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    YoungAdult,
    Adult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub age: u32,
    pub bmi: f64,
    pub age_group: AgeGroup,
}

/// Risk percentage per horizon, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPercentages {
    #[serde(rename = "1_month_risk")]
    pub one_month: f64,
    #[serde(rename = "3_month_risk")]
    pub three_month: f64,
    #[serde(rename = "6_month_risk")]
    pub six_month: f64,
}

impl RiskPercentages {
    /// Same value for every horizon.
    pub fn flat(value: f64) -> Self {
        Self {
            one_month: value,
            three_month: value,
            six_month: value,
        }
    }

    pub fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::OneMonth => self.one_month,
            Horizon::ThreeMonths => self.three_month,
            Horizon::SixMonths => self.six_month,
        }
    }
}

/// A value for each forecast horizon, keyed `1_month`, `3_month`, `6_month`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonValues<T> {
    #[serde(rename = "1_month")]
    pub one_month: T,
    #[serde(rename = "3_month")]
    pub three_month: T,
    #[serde(rename = "6_month")]
    pub six_month: T,
}

impl<T: Copy> HorizonValues<T> {
    pub fn from_fn(mut f: impl FnMut(Horizon) -> T) -> Self {
        Self {
            one_month: f(Horizon::OneMonth),
            three_month: f(Horizon::ThreeMonths),
            six_month: f(Horizon::SixMonths),
        }
    }

    pub fn get(&self, horizon: Horizon) -> T {
        match horizon {
            Horizon::OneMonth => self.one_month,
            Horizon::ThreeMonths => self.three_month,
            Horizon::SixMonths => self.six_month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    BaselineOnly,
    ActivityAdjusted,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::BaselineOnly => "baseline_only",
            CalculationMethod::ActivityAdjusted => "activity_adjusted",
        }
    }
}

/// Rationale behind the percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub baseline_risk: f64,
    pub activity_level: ActivityTier,
    pub median_daily_steps: f64,
    pub diabetes_risk_level: RiskTier,
    pub risk_calculation_method: CalculationMethod,
    pub reason: String,
    /// Percentage points added per horizon (activity-adjusted only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_adjustments: Option<HorizonValues<f64>>,
}

/// Projection figures that drove an activity-adjusted forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureStepsForecast {
    pub avg_daily_steps: f64,
    pub days_below_5000: HorizonValues<usize>,
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub patient_info: PatientInfo,
    pub risk_percentages: RiskPercentages,
    pub analysis: Analysis,
    pub step_analysis: ActivitySummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_steps_forecast: Option<FutureStepsForecast>,
    pub recommendations: Vec<String>,
}

impl RiskAssessment {
    pub fn method(&self) -> CalculationMethod {
        self.analysis.risk_calculation_method
    }
}
