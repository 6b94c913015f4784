//! Risk tier classification capability.
//!
//! The pipeline consumes tier prediction only through [`TierClassifier`].
//! Any model that can map (age, BMI, activity tier) to a probability can sit
//! behind it. Two implementations ship with the crate:
//!
//! - [`LogisticTierClassifier`]: a portable logistic model loaded from JSON
//! - [`FixedTierClassifier`]: returns a configured probability, for tests
//!   and demos

pub mod fixed;
pub mod logistic;
pub mod types;

pub use fixed::FixedTierClassifier;
pub use logistic::{FeatureScaler, LogisticModel, LogisticTierClassifier};
pub use types::{Confidence, RiskTier, RiskTierResult, TierQuery, TierThresholds};

use crate::error::Result;

/// Maps (age, BMI, activity tier) to a probabilistic risk category.
///
/// Implementations must be pure with respect to their inputs and should be
/// fast; the pipeline calls them synchronously. Failures are reported as
/// [`crate::RiskError::ExternalCapability`].
pub trait TierClassifier: Send + Sync {
    fn predict_tier(&self, query: &TierQuery) -> Result<RiskTierResult>;

    /// Short identifier for logs and health output.
    fn name(&self) -> &str;
}
