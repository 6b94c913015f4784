//! Assessment audit log.
//!
//! Counts what the pipeline decided, per calculation method, without
//! retaining any age, BMI or step values.

use crate::core::assessment::{CalculationMethod, RiskAssessment};
use crate::error::RiskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current process.
#[derive(Debug)]
pub struct AssessmentLog {
    /// Number of completed assessments
    assessments: AtomicU64,
    /// Assessments that used the baseline for every horizon
    baseline_only: AtomicU64,
    /// Assessments that applied the sedentary-day penalty
    activity_adjusted: AtomicU64,
    /// Requests rejected as invalid input
    rejected: AtomicU64,
    /// Requests that failed on a consumed capability
    capability_failures: AtomicU64,
    /// Process start time
    started_at: DateTime<Utc>,
}

impl AssessmentLog {
    pub fn new() -> Self {
        Self {
            assessments: AtomicU64::new(0),
            baseline_only: AtomicU64::new(0),
            activity_adjusted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            capability_failures: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Record a completed assessment.
    pub fn record_assessment(&self, assessment: &RiskAssessment) {
        self.assessments.fetch_add(1, Ordering::Relaxed);
        let counter = match assessment.method() {
            CalculationMethod::BaselineOnly => &self.baseline_only,
            CalculationMethod::ActivityAdjusted => &self.activity_adjusted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed assessment.
    pub fn record_error(&self, error: &RiskError) {
        let counter = match error {
            RiskError::InvalidInput(_) => &self.rejected,
            RiskError::ExternalCapability(_) => &self.capability_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one pipeline run.
    pub fn record(&self, outcome: &Result<RiskAssessment, RiskError>) -> &Self {
        match outcome {
            Ok(assessment) => self.record_assessment(assessment),
            Err(e) => self.record_error(e),
        }
        self
    }

    pub fn stats(&self) -> AssessmentStats {
        AssessmentStats {
            assessments: self.assessments.load(Ordering::Relaxed),
            baseline_only: self.baseline_only.load(Ordering::Relaxed),
            activity_adjusted: self.activity_adjusted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            capability_failures: self.capability_failures.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Assessment Statistics:\n\
             - Assessments completed: {}\n\
             - Baseline only: {}\n\
             - Activity adjusted: {}\n\
             - Rejected inputs: {}\n\
             - Capability failures: {}\n\
             - Uptime: {} seconds\n\
             \n\
             Privacy:\n\
             - No age, BMI or step values are retained",
            stats.assessments,
            stats.baseline_only,
            stats.activity_adjusted,
            stats.rejected,
            stats.capability_failures,
            stats.uptime_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.assessments,
            &self.baseline_only,
            &self.activity_adjusted,
            &self.rejected,
            &self.capability_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for AssessmentLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the audit counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentStats {
    pub assessments: u64,
    pub baseline_only: u64,
    pub activity_adjusted: u64,
    pub rejected: u64,
    pub capability_failures: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Thread-safe shared assessment log.
pub type SharedAssessmentLog = Arc<AssessmentLog>;

pub fn create_shared_log() -> SharedAssessmentLog {
    Arc::new(AssessmentLog::new())
}
