//! Transparency module.
//!
//! Exposes what the service has decided so far, supporting user trust and
//! clinical review, without storing personal data.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, AssessmentLog, AssessmentStats, SharedAssessmentLog};
