//! Core risk computation.
//!
//! This module contains:
//! - Input validation for age, BMI and the 28-day step window
//! - The age-only baseline risk curve
//! - Activity tier classification from daily steps
//! - Step pattern projection over the forecast horizons
//! - The pipeline that composes them into a [`RiskAssessment`]

pub mod activity;
pub mod advice;
pub mod assessment;
pub mod baseline;
pub mod pipeline;
pub mod profile;
pub mod projection;

// Re-export commonly used types
pub use activity::{classify_activity, ActivityClassifier, ActivitySummary, ActivityTier};
pub use assessment::{
    AgeGroup, Analysis, CalculationMethod, FutureStepsForecast, HorizonValues, PatientInfo,
    RiskAssessment, RiskPercentages,
};
pub use baseline::{baseline_risk, AgeGroupInfo, BaselineCategory, BaselineRiskModel};
pub use pipeline::{PipelineParams, RiskPipeline};
pub use profile::{AgeBmiStepProfile, ProfileInput};
pub use projection::{
    extend_pattern, project_future_steps, FutureProjection, FutureStepsProjector, Horizon,
    HorizonProjection, WindowSummary, WINDOW_DAYS,
};

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
