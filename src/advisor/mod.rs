//! Free-text recommendations from a language model.
//!
//! An assessment is reduced to a [`UserProfile`], one prompt is built per
//! requested [`RecommendationKind`], and every prompt is sent as its own
//! task. Tasks share nothing and are never retried; each one either yields
//! its text or its own error.

pub mod client;
pub mod prompts;

pub use client::{AdvisorClient, AdvisorConfig, AdvisorError, Completion};
pub use prompts::{QuickProfile, RecommendationKind, UserProfile};

use crate::core::assessment::RiskAssessment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Anything that can turn a prompt into a completion.
#[async_trait]
pub trait RecommendationBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion, AdvisorError>;

    /// Model identifier reported alongside results.
    fn model(&self) -> &str;
}

#[async_trait]
impl RecommendationBackend for AdvisorClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, AdvisorError> {
        AdvisorClient::complete(self, prompt).await
    }

    fn model(&self) -> &str {
        AdvisorClient::model(self)
    }
}

/// Outcome for a single recommendation kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    pub kind: RecommendationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationOutcome {
    pub fn is_ok(&self) -> bool {
        self.content.is_some()
    }
}

/// Aggregate token accounting over the successful requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub api_calls: u32,
}

/// Everything generated for one assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub user_profile: UserProfile,
    /// In request order
    pub recommendations: Vec<RecommendationOutcome>,
    pub model_used: String,
    pub generated_at: DateTime<Utc>,
    pub usage: TokenUsage,
}

impl RecommendationReport {
    pub fn get(&self, kind: RecommendationKind) -> Option<&RecommendationOutcome> {
        self.recommendations.iter().find(|o| o.kind == kind)
    }

    pub fn all_failed(&self) -> bool {
        self.recommendations.iter().all(|o| !o.is_ok())
    }
}

/// Request every kind in `kinds` concurrently.
///
/// Each request is bounded by `timeout`. A failure or timeout in one kind
/// does not affect the others.
pub async fn generate_recommendations(
    backend: Arc<dyn RecommendationBackend>,
    assessment: &RiskAssessment,
    kinds: &[RecommendationKind],
    timeout: Duration,
) -> RecommendationReport {
    let profile = UserProfile::from_assessment(assessment);
    generate_for_profile(backend, profile, kinds, timeout).await
}

/// Same as [`generate_recommendations`], for a profile that did not come
/// from a pipeline run.
pub async fn generate_for_profile(
    backend: Arc<dyn RecommendationBackend>,
    profile: UserProfile,
    kinds: &[RecommendationKind],
    timeout: Duration,
) -> RecommendationReport {
    let mut tasks = JoinSet::new();
    for (index, &kind) in kinds.iter().enumerate() {
        let backend = Arc::clone(&backend);
        let prompt = kind.prompt(&profile);
        tasks.spawn(async move {
            let result = match tokio::time::timeout(timeout, backend.complete(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(AdvisorError::Timeout(timeout)),
            };
            (index, result)
        });
    }

    let mut outcomes: Vec<RecommendationOutcome> = kinds
        .iter()
        .map(|&kind| RecommendationOutcome {
            kind,
            content: None,
            error: Some("Recommendation task did not complete".to_string()),
        })
        .collect();
    let mut usage = TokenUsage::default();

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!(error = %e, "recommendation task aborted");
                continue;
            }
        };

        let outcome = &mut outcomes[index];
        match result {
            Ok(completion) => {
                usage.total_input_tokens += completion.input_tokens;
                usage.total_output_tokens += completion.output_tokens;
                usage.api_calls += 1;
                outcome.content = Some(completion.text);
                outcome.error = None;
            }
            Err(e) => {
                tracing::warn!(kind = outcome.kind.as_str(), error = %e, "recommendation failed");
                outcome.error = Some(e.to_string());
            }
        }
    }

    RecommendationReport {
        user_profile: profile,
        recommendations: outcomes,
        model_used: backend.model().to_string(),
        generated_at: Utc::now(),
        usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::types::TierThresholds;
    use crate::classifier::FixedTierClassifier;
    use crate::core::pipeline::{PipelineParams, RiskPipeline};

    /// Answers instantly except for prompts containing `slow_marker`.
    struct MockBackend {
        slow_marker: Option<&'static str>,
        fail_marker: Option<&'static str>,
    }

    #[async_trait]
    impl RecommendationBackend for MockBackend {
        async fn complete(&self, prompt: &str) -> Result<Completion, AdvisorError> {
            if self.slow_marker.is_some_and(|m| prompt.contains(m)) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if self.fail_marker.is_some_and(|m| prompt.contains(m)) {
                return Err(AdvisorError::Server {
                    status: 529,
                    message: "overloaded".to_string(),
                });
            }
            Ok(Completion {
                text: format!("advice for {} chars", prompt.len()),
                model: "mock".to_string(),
                input_tokens: 100,
                output_tokens: 20,
                generated_at: Utc::now(),
            })
        }

        fn model(&self) -> &str {
            "mock"
        }
    }

    fn assessment() -> RiskAssessment {
        let classifier = FixedTierClassifier::new(0.45, TierThresholds::default()).unwrap();
        RiskPipeline::new(Arc::new(classifier), PipelineParams::default())
            .calculate(58, 31.2, vec![3500; 28])
            .unwrap()
    }

    #[tokio::test]
    async fn test_all_kinds_succeed() {
        let backend = Arc::new(MockBackend {
            slow_marker: None,
            fail_marker: None,
        });
        let report = generate_recommendations(
            backend,
            &assessment(),
            &RecommendationKind::ALL,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(report.recommendations.len(), 3);
        assert!(report.recommendations.iter().all(|o| o.is_ok()));
        assert_eq!(report.recommendations[1].kind, RecommendationKind::Activity);
        assert_eq!(report.usage.total_input_tokens, 300);
        assert_eq!(report.usage.total_output_tokens, 60);
        assert_eq!(report.usage.api_calls, 3);
        assert_eq!(report.user_profile.age, 58);
    }

    #[tokio::test]
    async fn test_one_failure_is_isolated() {
        let backend = Arc::new(MockBackend {
            slow_marker: None,
            fail_marker: Some("Suggested target"),
        });
        let report = generate_recommendations(
            backend,
            &assessment(),
            &RecommendationKind::ALL,
            Duration::from_secs(5),
        )
        .await;

        let activity = report.get(RecommendationKind::Activity).unwrap();
        assert!(!activity.is_ok());
        assert!(activity.error.as_deref().unwrap().contains("529"));
        assert!(report.get(RecommendationKind::Comprehensive).unwrap().is_ok());
        assert_eq!(report.usage.api_calls, 2);
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn test_timeout_bounds_each_task() {
        let backend = Arc::new(MockBackend {
            slow_marker: Some("What These Numbers Mean"),
            fail_marker: None,
        });
        let started = std::time::Instant::now();
        let report = generate_recommendations(
            backend,
            &assessment(),
            &RecommendationKind::ALL,
            Duration::from_millis(100),
        )
        .await;

        assert!(started.elapsed() < Duration::from_secs(3));
        let explanation = report.get(RecommendationKind::RiskExplanation).unwrap();
        assert!(explanation.error.as_deref().unwrap().contains("timed out"));
        assert!(report.get(RecommendationKind::Activity).unwrap().is_ok());
    }
}
