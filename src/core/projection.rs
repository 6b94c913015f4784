//! Future step projection by cycling the observed 28-day window.
//!
//! This is a deliberate simplification: future behavior is assumed to
//! mirror the observed window. There is no learned time-series model.

use crate::core::round_to;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Required length of the observed window.
pub const WINDOW_DAYS: usize = 28;

/// Default cut-off for a sedentary day.
pub const DEFAULT_SEDENTARY_THRESHOLD: i64 = 5_000;

/// Step count at or above which a day counts as very active.
const ACTIVE_DAY_STEPS: i64 = 10_000;

/// Forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1_month")]
    OneMonth,
    #[serde(rename = "3_month")]
    ThreeMonths,
    #[serde(rename = "6_month")]
    SixMonths,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::OneMonth, Horizon::ThreeMonths, Horizon::SixMonths];

    /// Number of projected days in this horizon.
    pub fn days(&self) -> usize {
        match self {
            Horizon::OneMonth => 30,
            Horizon::ThreeMonths => 90,
            Horizon::SixMonths => 180,
        }
    }
}

/// Projected days for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonProjection {
    pub horizon: Horizon,
    pub steps: Vec<i64>,
    pub days_below_threshold: usize,
}

/// Projection of the observed window over every horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureProjection {
    /// Mean of the observed window, rounded to 2 decimals
    pub avg_daily_steps: f64,
    pub sedentary_threshold: i64,
    pub one_month: HorizonProjection,
    pub three_months: HorizonProjection,
    pub six_months: HorizonProjection,
}

impl FutureProjection {
    pub fn horizon(&self, horizon: Horizon) -> &HorizonProjection {
        match horizon {
            Horizon::OneMonth => &self.one_month,
            Horizon::ThreeMonths => &self.three_months,
            Horizon::SixMonths => &self.six_months,
        }
    }

    pub fn days_below_threshold(&self, horizon: Horizon) -> usize {
        self.horizon(horizon).days_below_threshold
    }
}

/// Descriptive statistics over the raw observed window (no outlier filtering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub mean_steps: f64,
    pub median_steps: f64,
    pub min_steps: i64,
    pub max_steps: i64,
    pub std_steps: f64,
    pub days_below_5000: usize,
    pub days_above_10000: usize,
    pub total_steps_28_days: i64,
}

/// Repeats the observed window to cover each horizon.
#[derive(Debug, Clone, Copy)]
pub struct FutureStepsProjector {
    sedentary_threshold: i64,
}

impl Default for FutureStepsProjector {
    fn default() -> Self {
        Self::new(DEFAULT_SEDENTARY_THRESHOLD)
    }
}

impl FutureStepsProjector {
    pub fn new(sedentary_threshold: i64) -> Self {
        Self {
            sedentary_threshold,
        }
    }

    /// Project the observed window over 30, 90 and 180 days.
    pub fn project(&self, past: &[i64]) -> Result<FutureProjection> {
        check_window(past)?;

        let build = |horizon: Horizon| {
            let steps = extend_pattern(past, horizon.days());
            let days_below_threshold = count_below(&steps, self.sedentary_threshold);
            HorizonProjection {
                horizon,
                steps,
                days_below_threshold,
            }
        };

        let mean = past.iter().map(|&s| s as f64).mean();

        Ok(FutureProjection {
            avg_daily_steps: round_to(mean, 2),
            sedentary_threshold: self.sedentary_threshold,
            one_month: build(Horizon::OneMonth),
            three_months: build(Horizon::ThreeMonths),
            six_months: build(Horizon::SixMonths),
        })
    }

    /// Summary statistics for the observed window.
    pub fn summary(&self, past: &[i64]) -> Result<WindowSummary> {
        check_window(past)?;

        let values: Vec<f64> = past.iter().map(|&s| s as f64).collect();
        let mut sorted = past.to_vec();
        sorted.sort_unstable();
        let median = (sorted[WINDOW_DAYS / 2 - 1] as f64 + sorted[WINDOW_DAYS / 2] as f64) / 2.0;
        let total = past
            .iter()
            .try_fold(0i64, |acc, &s| acc.checked_add(s))
            .ok_or_else(|| RiskError::invalid("Total step count is out of range"))?;

        Ok(WindowSummary {
            mean_steps: round_to(values.iter().mean(), 2),
            median_steps: round_to(median, 2),
            min_steps: sorted[0],
            max_steps: sorted[WINDOW_DAYS - 1],
            std_steps: round_to(values.iter().population_std_dev(), 2),
            days_below_5000: count_below(past, DEFAULT_SEDENTARY_THRESHOLD),
            days_above_10000: past.iter().filter(|&&s| s >= ACTIVE_DAY_STEPS).count(),
            total_steps_28_days: total,
        })
    }
}

fn check_window(past: &[i64]) -> Result<()> {
    if past.len() != WINDOW_DAYS {
        return Err(RiskError::invalid(format!(
            "Input must contain exactly {WINDOW_DAYS} days of step data, got {}",
            past.len()
        )));
    }
    Ok(())
}

/// Repeat `pattern` until `days` values are produced: whole cycles first,
/// then a prefix of the pattern for the remainder.
pub fn extend_pattern(pattern: &[i64], days: usize) -> Vec<i64> {
    if pattern.is_empty() {
        return Vec::new();
    }
    pattern.iter().copied().cycle().take(days).collect()
}

fn count_below(steps: &[i64], threshold: i64) -> usize {
    steps.iter().filter(|&&s| s < threshold).count()
}

/// Convenience wrapper using the default sedentary threshold.
pub fn project_future_steps(past: &[i64]) -> Result<FutureProjection> {
    FutureStepsProjector::default().project(past)
}
