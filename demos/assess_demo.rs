//! Demonstration of the DiabetaLens risk pipeline.
//!
//! This example shows how to:
//! 1. Load a logistic tier model
//! 2. Build a risk pipeline
//! 3. Assess a few representative profiles
//! 4. Inspect the audit counters
//!
//! Run with: cargo run --example assess_demo

use std::path::Path;
use std::sync::Arc;

use diabetalens::{
    core::{CalculationMethod, PipelineParams, RiskPipeline},
    transparency::AssessmentLog,
    LogisticTierClassifier, TierThresholds, MEDICAL_DISCLAIMER,
};

fn main() -> anyhow::Result<()> {
    println!("DiabetaLens - Assessment Demo");
    println!("=============================");
    println!("{MEDICAL_DISCLAIMER}");

    let model_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/tier_model.json");
    let classifier = LogisticTierClassifier::from_path(&model_path, TierThresholds::default())?;
    println!("Loaded tier model '{}'", classifier.model().name);
    println!();

    let pipeline = RiskPipeline::new(Arc::new(classifier), PipelineParams::default());
    let log = AssessmentLog::new();

    let week = [4200, 7800, 3100, 9600, 12000, 2500, 6100];
    let mixed: Vec<i64> = week.iter().copied().cycle().take(28).collect();

    let profiles: [(&str, i64, f64, Vec<i64>); 4] = [
        ("Active young adult", 25, 22.0, vec![8000; 28]),
        ("Sedentary older adult", 58, 31.2, vec![3500; 28]),
        ("Mixed week, healthy weight", 45, 23.0, mixed.clone()),
        ("Mixed week, obese", 66, 34.5, mixed),
    ];

    for (label, age, bmi, steps) in profiles {
        let outcome = pipeline.calculate(age, bmi, steps);
        log.record(&outcome);

        let assessment = outcome?;
        let risk = &assessment.risk_percentages;
        println!("{label} (age {age}, BMI {bmi})");
        println!(
            "  Activity: {} (median {} steps)",
            assessment.step_analysis.tier, assessment.step_analysis.median_steps
        );
        println!("  Tier: {}", assessment.analysis.diabetes_risk_level);
        println!(
            "  Risk: {:.2}% / {:.2}% / {:.2}% (1/3/6 months)",
            risk.one_month, risk.three_month, risk.six_month
        );
        if assessment.method() == CalculationMethod::ActivityAdjusted {
            if let Some(forecast) = &assessment.future_steps_forecast {
                println!(
                    "  Sedentary days ahead: {} / {} / {}",
                    forecast.days_below_5000.one_month,
                    forecast.days_below_5000.three_month,
                    forecast.days_below_5000.six_month
                );
            }
        }
        println!("  {}", assessment.analysis.reason);
        println!();
    }

    println!("{}", log.summary());
    Ok(())
}
