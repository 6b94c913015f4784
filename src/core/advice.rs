//! Static advisory text attached to every assessment.
//!
//! Selected purely from the branch taken and the activity tier, so it can
//! never fail. Free-text advice from the language model lives in
//! `crate::advisor`.

use crate::classifier::types::RiskTier;
use crate::core::activity::ActivityTier;

/// Advice for people below the adult age threshold.
pub fn young_person(activity: ActivityTier) -> Vec<String> {
    let mut advice = vec![
        "Maintain healthy lifestyle habits to prevent future diabetes risk",
        "Continue regular physical activity to build long-term health patterns",
    ];

    match activity {
        ActivityTier::Low => advice.extend([
            "Consider increasing daily steps to at least 6,000-8,000 per day",
            "Aim for 150 minutes of moderate exercise per week",
        ]),
        ActivityTier::Moderate => {
            advice.push("Good activity level - maintain current exercise routine")
        }
        ActivityTier::High => advice.push("Excellent activity level - keep up the great work!"),
    }

    into_owned(advice)
}

/// Advice for adults whose computed tier is low-risk.
pub fn low_risk(activity: ActivityTier) -> Vec<String> {
    let mut advice = vec![
        "Low diabetes risk - continue current lifestyle",
        "Maintain regular health check-ups",
    ];

    match activity {
        ActivityTier::Low => advice.extend([
            "Consider increasing daily activity for general health benefits",
            "Aim for at least 7,000-8,000 steps per day",
        ]),
        ActivityTier::Moderate => advice.push("Good activity level - maintain current routine"),
        ActivityTier::High => advice.push("Excellent activity level - keep it up!"),
    }

    into_owned(advice)
}

/// Advice for adults whose computed tier is medium- or high-risk.
pub fn elevated_risk(activity: ActivityTier, tier: RiskTier) -> Vec<String> {
    let mut advice = vec![
        format!("{} diabetes risk detected", tier.title()),
        "Consult with healthcare provider about diabetes prevention strategies".to_string(),
        "Consider regular blood glucose monitoring".to_string(),
    ];

    let tail: &[&str] = match activity {
        ActivityTier::Low => &[
            "PRIORITY: Increase physical activity - aim for 8,000+ steps daily",
            "Focus on reducing sedentary days (< 5,000 steps) as they increase risk",
            "Start with walking 30 minutes daily, gradually increase intensity",
        ],
        ActivityTier::Moderate => &[
            "Good activity level, but consider increasing to 10,000+ steps daily",
            "Add strength training 2-3 times per week",
        ],
        ActivityTier::High => &[
            "Excellent activity level - maintain current routine",
            "Consider adding variety with different types of exercise",
        ],
    };
    advice.extend(tail.iter().map(|s| s.to_string()));

    advice
}

fn into_owned(items: Vec<&str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}
