//! Risk assessment pipeline.
//!
//! ```text
//! validate ─▶ baseline ─┬─ age < adult_age ──────────────────────▶ young (baseline only)
//!                       └─ adult ─▶ activity ─▶ tier ─┬─ low-risk ─▶ low risk (baseline only)
//!                                                     └─ elevated ─▶ projection ─▶ activity adjusted
//! ```
//!
//! Every branch returns a fully populated [`RiskAssessment`]. The pipeline
//! holds no per-request state and can be shared across threads.

use crate::classifier::types::{RiskTier, RiskTierResult, TierQuery};
use crate::classifier::TierClassifier;
use crate::core::activity::{ActivityClassifier, ActivitySummary, ActivityTier};
use crate::core::advice;
use crate::core::assessment::{
    AgeGroup, Analysis, CalculationMethod, FutureStepsForecast, HorizonValues, PatientInfo,
    RiskAssessment, RiskPercentages,
};
use crate::core::baseline::BaselineRiskModel;
use crate::core::profile::{AgeBmiStepProfile, ProfileInput};
use crate::core::projection::{FutureStepsProjector, Horizon, DEFAULT_SEDENTARY_THRESHOLD};
use crate::core::round_to;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tunable constants of the decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Ages below this always use the baseline risk
    pub adult_age: u32,
    /// Projected days with fewer steps than this are sedentary
    pub sedentary_threshold: i64,
    /// Percentage points added per projected sedentary day
    pub penalty_per_sedentary_day: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            adult_age: 30,
            sedentary_threshold: DEFAULT_SEDENTARY_THRESHOLD,
            penalty_per_sedentary_day: 0.1,
        }
    }
}

/// Branch selected after baseline (and, for adults, tier) computation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Route {
    Young,
    LowRisk(RiskTierResult),
    Escalated(RiskTierResult),
}

/// Composes baseline, activity, tier and projection into an assessment.
#[derive(Clone)]
pub struct RiskPipeline {
    classifier: Arc<dyn TierClassifier>,
    params: PipelineParams,
    baseline: BaselineRiskModel,
    activity: ActivityClassifier,
    projector: FutureStepsProjector,
}

impl RiskPipeline {
    pub fn new(classifier: Arc<dyn TierClassifier>, params: PipelineParams) -> Self {
        Self {
            classifier,
            params,
            baseline: BaselineRiskModel::new(),
            activity: ActivityClassifier::new(),
            projector: FutureStepsProjector::new(params.sedentary_threshold),
        }
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Validate raw input, then assess it.
    pub fn assess_input(&self, input: ProfileInput) -> Result<RiskAssessment> {
        let profile = AgeBmiStepProfile::try_from(input)?;
        self.assess(&profile)
    }

    /// Validate loose arguments, then assess them.
    pub fn calculate(&self, age: i64, bmi: f64, steps: Vec<i64>) -> Result<RiskAssessment> {
        let profile = AgeBmiStepProfile::new(age, bmi, steps)?;
        self.assess(&profile)
    }

    /// Assess an already validated profile.
    pub fn assess(&self, profile: &AgeBmiStepProfile) -> Result<RiskAssessment> {
        let baseline = self.baseline.baseline_risk(f64::from(profile.age()))?;
        // computed on every branch; the young branch reports it for transparency
        let activity = self.activity.classify(profile.steps())?;

        let route = if profile.age() < self.params.adult_age {
            Route::Young
        } else {
            let tier = self.predict_tier(profile, activity.tier)?;
            if tier.tier.is_elevated() {
                Route::Escalated(tier)
            } else {
                Route::LowRisk(tier)
            }
        };

        tracing::debug!(
            age = profile.age(),
            baseline,
            activity = %activity.tier,
            route = ?route,
            "risk route selected"
        );

        match route {
            Route::Young => Ok(self.young(profile, baseline, activity)),
            Route::LowRisk(tier) => Ok(self.low_risk(profile, baseline, activity, tier.tier)),
            Route::Escalated(tier) => self.escalated(profile, baseline, activity, tier.tier),
        }
    }

    fn predict_tier(
        &self,
        profile: &AgeBmiStepProfile,
        activity: ActivityTier,
    ) -> Result<RiskTierResult> {
        let query = TierQuery {
            age: profile.age(),
            bmi: profile.bmi(),
            activity_level: activity,
        };

        let result = self.classifier.predict_tier(&query).map_err(|e| match e {
            external @ RiskError::ExternalCapability(_) => external,
            other => RiskError::external(other.to_string()),
        })?;

        if !result.probability.is_finite() || !(0.0..=1.0).contains(&result.probability) {
            return Err(RiskError::external(format!(
                "Tier classifier '{}' returned probability {} outside [0, 1]",
                self.classifier.name(),
                result.probability
            )));
        }

        Ok(result)
    }

    fn patient_info(&self, profile: &AgeBmiStepProfile) -> PatientInfo {
        let age_group = if profile.age() < self.params.adult_age {
            AgeGroup::YoungAdult
        } else {
            AgeGroup::Adult
        };
        PatientInfo {
            age: profile.age(),
            bmi: profile.bmi(),
            age_group,
        }
    }

    fn young(
        &self,
        profile: &AgeBmiStepProfile,
        baseline: f64,
        activity: ActivitySummary,
    ) -> RiskAssessment {
        let analysis = Analysis {
            baseline_risk: baseline,
            activity_level: activity.tier,
            median_daily_steps: activity.median_steps,
            // not computed below the adult age
            diabetes_risk_level: RiskTier::LowRisk,
            risk_calculation_method: CalculationMethod::BaselineOnly,
            reason: format!(
                "Age < {}: Using baseline risk for all time periods",
                self.params.adult_age
            ),
            risk_adjustments: None,
        };

        RiskAssessment {
            patient_info: self.patient_info(profile),
            risk_percentages: RiskPercentages::flat(baseline),
            analysis,
            recommendations: advice::young_person(activity.tier),
            step_analysis: activity,
            future_steps_forecast: None,
        }
    }

    fn low_risk(
        &self,
        profile: &AgeBmiStepProfile,
        baseline: f64,
        activity: ActivitySummary,
        tier: RiskTier,
    ) -> RiskAssessment {
        let analysis = Analysis {
            baseline_risk: baseline,
            activity_level: activity.tier,
            median_daily_steps: activity.median_steps,
            diabetes_risk_level: tier,
            risk_calculation_method: CalculationMethod::BaselineOnly,
            reason: format!(
                "Age >= {} but {tier}: Using baseline risk for all time periods",
                self.params.adult_age
            ),
            risk_adjustments: None,
        };

        RiskAssessment {
            patient_info: self.patient_info(profile),
            risk_percentages: RiskPercentages::flat(baseline),
            analysis,
            recommendations: advice::low_risk(activity.tier),
            step_analysis: activity,
            future_steps_forecast: None,
        }
    }

    fn escalated(
        &self,
        profile: &AgeBmiStepProfile,
        baseline: f64,
        activity: ActivitySummary,
        tier: RiskTier,
    ) -> Result<RiskAssessment> {
        let projection = self.projector.project(profile.steps())?;
        let penalty = self.params.penalty_per_sedentary_day;

        let days = HorizonValues::from_fn(|h| projection.days_below_threshold(h));
        let adjustments = HorizonValues::from_fn(|h| round_to(days.get(h) as f64 * penalty, 2));
        let risk = |h| round_to(baseline + days.get(h) as f64 * penalty, 2);

        let risk_percentages = RiskPercentages {
            one_month: risk(Horizon::OneMonth),
            three_month: risk(Horizon::ThreeMonths),
            six_month: risk(Horizon::SixMonths),
        };

        tracing::debug!(
            days_1m = days.one_month,
            days_3m = days.three_month,
            days_6m = days.six_month,
            "activity-adjusted forecast"
        );

        let analysis = Analysis {
            baseline_risk: baseline,
            activity_level: activity.tier,
            median_daily_steps: activity.median_steps,
            diabetes_risk_level: tier,
            risk_calculation_method: CalculationMethod::ActivityAdjusted,
            reason: format!(
                "Age >= {} and {tier}: Using activity-adjusted risk calculation",
                self.params.adult_age
            ),
            risk_adjustments: Some(adjustments),
        };

        Ok(RiskAssessment {
            patient_info: self.patient_info(profile),
            risk_percentages,
            analysis,
            recommendations: advice::elevated_risk(activity.tier, tier),
            step_analysis: activity,
            future_steps_forecast: Some(FutureStepsForecast {
                avg_daily_steps: projection.avg_daily_steps,
                days_below_5000: days,
            }),
        })
    }
}
