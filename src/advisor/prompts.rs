//! Prompt templates for the recommendation service.
//!
//! Each [`RecommendationKind`] has its own template. All of them start from
//! the same guardrail preamble and read only the [`UserProfile`] fields.

use crate::classifier::types::RiskTier;
use crate::core::activity::ActivityTier;
use crate::core::assessment::RiskAssessment;
use crate::error::{Result as RiskResult, RiskError};
use serde::{Deserialize, Serialize};

const PREAMBLE: &str = "\
You are a helpful health and wellness advisor providing personalized recommendations based on diabetes risk assessments. Your role is to:

1. Provide encouraging, actionable health advice
2. Give age-appropriate exercise and lifestyle suggestions
3. Explain health concepts in accessible language
4. Emphasize prevention and healthy habits
5. Always recommend consulting healthcare providers for medical decisions
6. Be positive and motivational while being realistic

IMPORTANT GUIDELINES:
- Never provide medical diagnoses or replace professional medical advice
- Focus on lifestyle modifications, exercise, and general wellness
- Use encouraging language that motivates positive changes
- Provide specific, actionable recommendations
- Consider age-appropriate activities and limitations
- Keep advice practical and achievable";

/// Which recommendation to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Comprehensive,
    Activity,
    RiskExplanation,
}

impl RecommendationKind {
    pub const ALL: [RecommendationKind; 3] = [
        RecommendationKind::Comprehensive,
        RecommendationKind::Activity,
        RecommendationKind::RiskExplanation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Comprehensive => "comprehensive",
            RecommendationKind::Activity => "activity",
            RecommendationKind::RiskExplanation => "risk_explanation",
        }
    }

    pub fn prompt(&self, profile: &UserProfile) -> String {
        match self {
            RecommendationKind::Comprehensive => comprehensive_prompt(profile),
            RecommendationKind::Activity => activity_prompt(profile),
            RecommendationKind::RiskExplanation => risk_explanation_prompt(profile),
        }
    }
}

impl std::str::FromStr for RecommendationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comprehensive" => Ok(RecommendationKind::Comprehensive),
            "activity" => Ok(RecommendationKind::Activity),
            "risk_explanation" => Ok(RecommendationKind::RiskExplanation),
            other => Err(format!(
                "Unknown recommendation type '{other}' (expected comprehensive, activity or risk_explanation)"
            )),
        }
    }
}

/// Unvalidated assessment results, as posted by a client that already ran
/// the risk calculation.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickProfile {
    pub age: i64,
    pub bmi: f64,
    pub activity_level: ActivityTier,
    pub median_steps: i64,
    pub diabetes_risk_level: RiskTier,
    pub risk_1_month: f64,
    pub risk_3_month: f64,
    pub risk_6_month: f64,
}

/// The part of an assessment the prompts are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub bmi: f64,
    pub activity_level: ActivityTier,
    pub median_steps: i64,
    pub diabetes_risk_level: RiskTier,
    pub risk_1_month: f64,
    pub risk_3_month: f64,
    pub risk_6_month: f64,
}

impl UserProfile {
    pub fn from_assessment(assessment: &RiskAssessment) -> Self {
        let risk = &assessment.risk_percentages;
        Self {
            age: assessment.patient_info.age,
            bmi: assessment.patient_info.bmi,
            activity_level: assessment.analysis.activity_level,
            median_steps: assessment.step_analysis.median_steps as i64,
            diabetes_risk_level: assessment.analysis.diabetes_risk_level,
            risk_1_month: risk.one_month,
            risk_3_month: risk.three_month,
            risk_6_month: risk.six_month,
        }
    }

    /// Profile from results computed elsewhere, checked against the same
    /// ranges the pipeline accepts.
    pub fn from_results(results: QuickProfile) -> RiskResult<Self> {
        if !(1..=120).contains(&results.age) {
            return Err(RiskError::invalid(format!(
                "Age must be between 1 and 120 years, got {}",
                results.age
            )));
        }
        if !(10.0..=60.0).contains(&results.bmi) {
            return Err(RiskError::invalid(format!(
                "BMI must be between 10 and 60, got {}",
                results.bmi
            )));
        }
        if results.median_steps < 0 {
            return Err(RiskError::invalid("Median steps cannot be negative"));
        }
        for (label, risk) in [
            ("1-month", results.risk_1_month),
            ("3-month", results.risk_3_month),
            ("6-month", results.risk_6_month),
        ] {
            if !(0.0..=100.0).contains(&risk) {
                return Err(RiskError::invalid(format!(
                    "{label} risk must be between 0 and 100, got {risk}"
                )));
            }
        }

        Ok(Self {
            age: results.age as u32,
            bmi: results.bmi,
            activity_level: results.activity_level,
            median_steps: results.median_steps,
            diabetes_risk_level: results.diabetes_risk_level,
            risk_1_month: results.risk_1_month,
            risk_3_month: results.risk_3_month,
            risk_6_month: results.risk_6_month,
        })
    }

    /// Direction of the forecast across the horizons.
    pub fn risk_trend(&self) -> &'static str {
        if self.risk_6_month > self.risk_1_month * 1.1 {
            "increasing"
        } else if self.risk_6_month < self.risk_1_month * 0.9 {
            "decreasing"
        } else {
            "stable"
        }
    }

    /// Suggested daily step goal.
    pub fn step_target(&self) -> i64 {
        let current = self.median_steps;
        match self.activity_level {
            ActivityTier::Low => (current + 1500).min(8000),
            ActivityTier::Moderate => (current + 1000).min(10_000),
            ActivityTier::High => current.max(10_000),
        }
    }
}

fn age_context(age: u32) -> &'static str {
    match age {
        0..=29 => "This person is young with naturally lower diabetes risk. Focus on establishing healthy lifetime habits and maintaining their current good health status.",
        30..=44 => "This person is in a crucial age range for diabetes prevention. Small changes now can have significant long-term benefits. Focus on sustainable lifestyle improvements.",
        45..=59 => "This person is at an age where diabetes risk naturally increases. Emphasize the importance of consistent activity, weight management, and regular health monitoring.",
        _ => "This person is in an older age group with naturally higher diabetes risk. Focus on safe, sustainable activities and maintaining independence through fitness.",
    }
}

fn activity_context(activity: ActivityTier, steps: i64) -> String {
    let steps = thousands(steps);
    match activity {
        ActivityTier::Low => format!(
            "ACTIVITY STATUS: Currently sedentary with {steps} daily steps. Priority is gradually increasing movement and establishing regular activity habits."
        ),
        ActivityTier::Moderate => format!(
            "ACTIVITY STATUS: Good baseline activity with {steps} daily steps. Focus on optimizing current habits and adding structured exercise."
        ),
        ActivityTier::High => format!(
            "ACTIVITY STATUS: Excellent activity level with {steps} daily steps. Focus on maintaining consistency and adding variety to prevent plateaus."
        ),
    }
}

fn bmi_context(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "BMI STATUS: Underweight - focus on healthy weight gain through balanced nutrition and strength training."
    } else if bmi < 25.0 {
        "BMI STATUS: Healthy weight range - focus on maintaining current weight through balanced lifestyle."
    } else if bmi < 30.0 {
        "BMI STATUS: Overweight range - even modest weight loss (5-10% of body weight) can significantly reduce diabetes risk."
    } else {
        "BMI STATUS: Obesity range - weight management is a key priority for diabetes prevention. Focus on sustainable, gradual changes."
    }
}

pub fn comprehensive_prompt(p: &UserProfile) -> String {
    format!(
        "{PREAMBLE}

Please provide personalized health recommendations for the following individual:

USER PROFILE:
- Age: {age} years old
- BMI: {bmi}
- Current Activity Level: {activity} ({steps} avg daily steps)
- Diabetes Risk Level: {tier}
- Risk Progression: {r1:.1}% (1-month) -> {r3:.1}% (3-month) -> {r6:.1}% (6-month)
- Risk Trend: {trend}

CONTEXT:
{age_ctx}

{activity_ctx}

{bmi_ctx}

Please provide a comprehensive recommendation that includes:

**Priority Actions** (2-3 most important immediate steps)
**Activity Improvements** (specific, achievable step and exercise goals)
**Age-Appropriate Exercise** (suitable for {age}-year-old)
**Monitoring & Tracking** (what to measure and how often)
**Key Insights** (encouraging summary of their current status)

Format your response with clear sections and bullet points. Keep the tone encouraging and actionable. Focus on building upon their current habits rather than dramatic changes.",
        age = p.age,
        bmi = p.bmi,
        activity = p.activity_level,
        steps = thousands(p.median_steps),
        tier = p.diabetes_risk_level,
        r1 = p.risk_1_month,
        r3 = p.risk_3_month,
        r6 = p.risk_6_month,
        trend = p.risk_trend(),
        age_ctx = age_context(p.age),
        activity_ctx = activity_context(p.activity_level, p.median_steps),
        bmi_ctx = bmi_context(p.bmi),
    )
}

pub fn activity_prompt(p: &UserProfile) -> String {
    format!(
        "{PREAMBLE}

Focus specifically on activity and exercise improvements for:

USER PROFILE:
- Age: {age}
- Current Activity: {activity} ({steps} daily steps)
- Diabetes Risk: {tier}

Please provide specific activity recommendations including:

**Step Count Goals**:
- Current: {steps} steps/day
- Suggested target: {target} steps/day
- How to achieve this increase gradually

**Exercise Recommendations**:
- Age-appropriate activities for {age}-year-old
- Weekly exercise schedule
- Beginner-friendly options

**Implementation Strategy**:
- How to gradually increase activity
- Best times of day for exercise
- Ways to stay motivated

Keep recommendations specific, achievable, and tailored to their current fitness level.",
        age = p.age,
        activity = p.activity_level,
        steps = thousands(p.median_steps),
        tier = p.diabetes_risk_level,
        target = thousands(p.step_target()),
    )
}

pub fn risk_explanation_prompt(p: &UserProfile) -> String {
    format!(
        "{PREAMBLE}

Please explain diabetes risk assessment results in simple, reassuring terms:

RISK ASSESSMENT RESULTS:
- Current Risk Level: {tier}
- 1-month risk: {r1:.1}%
- 3-month risk: {r3:.1}%
- 6-month risk: {r6:.1}%

Please provide:

**What These Numbers Mean**:
- Explain risk percentages in everyday language
- Put numbers in perspective (population context)
- Emphasize that these are predictions, not certainties

**Positive Aspects**:
- What they're doing well
- Protective factors they have
- Encouraging context about their risk level

**Action Items**:
- Most impactful changes they can make
- Why these changes matter
- Realistic expectations for improvement

Keep the explanation encouraging, accurate, and empowering. Help them understand they have control over their health outcomes.",
        tier = p.diabetes_risk_level,
        r1 = p.risk_1_month,
        r3 = p.risk_3_month,
        r6 = p.risk_6_month,
    )
}

/// Format with comma thousands separators, e.g. `7,100`.
fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            age: 45,
            bmi: 28.5,
            activity_level: ActivityTier::Moderate,
            median_steps: 7100,
            diabetes_risk_level: RiskTier::LowRisk,
            risk_1_month: 5.2,
            risk_3_month: 5.8,
            risk_6_month: 6.4,
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(7100), "7,100");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_risk_trend() {
        let mut p = profile();
        assert_eq!(p.risk_trend(), "increasing");

        p.risk_6_month = 5.3;
        assert_eq!(p.risk_trend(), "stable");

        p.risk_6_month = 4.0;
        assert_eq!(p.risk_trend(), "decreasing");
    }

    #[test]
    fn test_step_targets() {
        let mut p = profile();
        assert_eq!(p.step_target(), 8100);

        p.activity_level = ActivityTier::Low;
        p.median_steps = 7000;
        assert_eq!(p.step_target(), 8000);

        p.activity_level = ActivityTier::High;
        p.median_steps = 12_000;
        assert_eq!(p.step_target(), 12_000);
    }

    #[test]
    fn test_comprehensive_prompt_contents() {
        let prompt = comprehensive_prompt(&profile());
        assert!(prompt.starts_with("You are a helpful health and wellness advisor"));
        assert!(prompt.contains("- Current Activity Level: moderate (7,100 avg daily steps)"));
        assert!(prompt.contains("5.2% (1-month)"));
        assert!(prompt.contains("Risk Trend: increasing"));
        assert!(prompt.contains("risk naturally increases"));
        assert!(prompt.contains("Overweight range"));
    }

    #[test]
    fn test_age_context_boundaries() {
        let mut p = profile();
        p.age = 44;
        assert!(comprehensive_prompt(&p).contains("crucial age range"));
        p.age = 29;
        assert!(comprehensive_prompt(&p).contains("naturally lower diabetes risk"));
        p.age = 60;
        assert!(comprehensive_prompt(&p).contains("older age group"));
    }

    #[test]
    fn test_activity_prompt_target() {
        let prompt = RecommendationKind::Activity.prompt(&profile());
        assert!(prompt.contains("Suggested target: 8,100 steps/day"));
    }

    fn quick() -> QuickProfile {
        QuickProfile {
            age: 45,
            bmi: 28.5,
            activity_level: ActivityTier::Moderate,
            median_steps: 7100,
            diabetes_risk_level: RiskTier::LowRisk,
            risk_1_month: 5.2,
            risk_3_month: 5.8,
            risk_6_month: 6.4,
        }
    }

    #[test]
    fn test_profile_from_results() {
        assert_eq!(UserProfile::from_results(quick()).unwrap(), profile());

        let mut bad = quick();
        bad.age = 0;
        assert!(UserProfile::from_results(bad).unwrap_err().is_invalid_input());

        let mut bad = quick();
        bad.bmi = 61.0;
        assert!(UserProfile::from_results(bad).is_err());

        let mut bad = quick();
        bad.risk_6_month = f64::NAN;
        assert!(UserProfile::from_results(bad).is_err());

        let mut bad = quick();
        bad.median_steps = -1;
        assert!(UserProfile::from_results(bad).is_err());
    }

    #[test]
    fn test_quick_profile_wire_names() {
        let quick: QuickProfile = serde_json::from_value(serde_json::json!({
            "age": 45,
            "bmi": 28.5,
            "activity_level": "moderate",
            "median_steps": 7100,
            "diabetes_risk_level": "low-risk",
            "risk_1_month": 5.2,
            "risk_3_month": 5.8,
            "risk_6_month": 6.4,
        }))
        .unwrap();
        assert_eq!(UserProfile::from_results(quick).unwrap(), profile());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "risk_explanation".parse::<RecommendationKind>().unwrap(),
            RecommendationKind::RiskExplanation
        );
        assert!("weekly".parse::<RecommendationKind>().is_err());
    }
}
