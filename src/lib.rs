//! DiabetaLens - diabetes risk forecasting from age, BMI and daily steps.
//!
//! This library estimates the probability of developing diabetes over
//! 1, 3 and 6 month horizons from a person's age, BMI and the last 28 days
//! of step counts.
//!
//! # Decision Procedure
//!
//! - **Baseline**: an age-only prevalence curve (ABS 2022) is always computed
//! - **Young people**: below the adult age the baseline is used for every horizon
//! - **Adults**: a tier classifier rates the profile low, medium or high risk
//! - **Escalation**: for medium/high tiers, every projected sedentary day adds
//!   a fixed penalty to the baseline
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RiskPipeline                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Baseline   │──▶│  Activity   │──▶│    Tier     │       │
//! │  │  (age)      │   │  (median)   │   │ Classifier  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                              │              │
//! │                                              ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │Transparency │                     │ Projection  │       │
//! │  │    Log      │                     │ (sedentary) │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use diabetalens::{FixedTierClassifier, PipelineParams, RiskPipeline, TierThresholds};
//!
//! let classifier = FixedTierClassifier::new(0.45, TierThresholds::default()).unwrap();
//! let pipeline = RiskPipeline::new(Arc::new(classifier), PipelineParams::default());
//!
//! let assessment = pipeline.calculate(58, 31.2, vec![3500; 28]).unwrap();
//! assert!(assessment.risk_percentages.six_month > assessment.risk_percentages.one_month);
//! ```

pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod transparency;

#[cfg(feature = "advisor")]
pub mod advisor;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use classifier::{
    FixedTierClassifier, LogisticTierClassifier, RiskTier, RiskTierResult, TierClassifier,
    TierQuery, TierThresholds,
};
pub use config::{Config, ConfigError};
pub use core::{
    ActivitySummary, ActivityTier, AgeBmiStepProfile, BaselineRiskModel, CalculationMethod,
    FutureStepsProjector, PipelineParams, ProfileInput, RiskAssessment, RiskPipeline,
};
pub use error::{Result, RiskError};
pub use transparency::{AssessmentLog, AssessmentStats, SharedAssessmentLog};

// Advisor re-exports (when enabled)
#[cfg(feature = "advisor")]
pub use advisor::{
    generate_for_profile, generate_recommendations, AdvisorClient, AdvisorConfig, AdvisorError,
    QuickProfile, RecommendationBackend, RecommendationKind, RecommendationReport, UserProfile,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Medical disclaimer shown alongside every result.
pub const MEDICAL_DISCLAIMER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║               DIABETALENS - MEDICAL DISCLAIMER                   ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  DiabetaLens produces statistical estimates for education and    ║
║  self-reflection. It is NOT a diagnostic tool.                   ║
║                                                                  ║
║  ✓ WHAT IT USES:                                                 ║
║    • Your age (population baseline, ABS 2022)                    ║
║    • Your BMI                                                    ║
║    • Your daily step counts over the last 28 days                ║
║                                                                  ║
║  ✗ WHAT IT CANNOT DO:                                            ║
║    • Diagnose diabetes or any other condition                    ║
║    • Account for blood tests, family history or medication       ║
║    • Replace advice from a healthcare provider                   ║
║                                                                  ║
║  Always consult a qualified healthcare provider about your       ║
║  diabetes risk and before changing your exercise routine.        ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disclaimer_contents() {
        assert!(MEDICAL_DISCLAIMER.contains("DISCLAIMER"));
        assert!(MEDICAL_DISCLAIMER.contains("NOT a diagnostic tool"));
        assert!(MEDICAL_DISCLAIMER.contains("healthcare provider"));
    }
}
