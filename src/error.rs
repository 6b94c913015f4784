//! Error taxonomy for risk assessment.

/// Errors raised while assessing risk.
///
/// `InvalidInput` is deterministic for a given input and is never worth
/// retrying. `ExternalCapability` comes from a collaborator (tier classifier,
/// recommendation service) and may be transient; retrying is the caller's call.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Age, BMI or step history out of range, or no usable step data
    InvalidInput(String),
    /// A consumed capability was unavailable or returned malformed output
    ExternalCapability(String),
}

impl RiskError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RiskError::InvalidInput(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        RiskError::ExternalCapability(msg.into())
    }

    /// Whether this error was caused by the request itself.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RiskError::InvalidInput(_))
    }
}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskError::InvalidInput(e) => write!(f, "Invalid input: {e}"),
            RiskError::ExternalCapability(e) => write!(f, "External capability error: {e}"),
        }
    }
}

impl std::error::Error for RiskError {}

pub type Result<T> = std::result::Result<T, RiskError>;
