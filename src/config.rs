//! Configuration for DiabetaLens.

use crate::classifier::types::TierThresholds;
use crate::core::pipeline::PipelineParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration.
///
/// Missing sections fall back to their defaults, so a config file only needs
/// to carry what it overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decision constants of the risk pipeline
    pub pipeline: PipelineParams,

    /// Probability cut-offs for tier and confidence
    pub thresholds: TierThresholds,

    /// Which tier classifier to load
    pub classifier: ClassifierConfig,

    /// Recommendation service settings (API key excluded)
    pub advisor: AdvisorSettings,

    /// HTTP transport settings
    pub server: ServerSettings,
}

impl Config {
    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("diabetalens")
            .join("config.json")
    }

    /// Reject values the pipeline cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if p.adult_age > 120 {
            return Err(ConfigError::InvalidValue(format!(
                "adult_age must be at most 120, got {}",
                p.adult_age
            )));
        }
        if !p.penalty_per_sedentary_day.is_finite() || p.penalty_per_sedentary_day < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "penalty_per_sedentary_day must be a non-negative number, got {}",
                p.penalty_per_sedentary_day
            )));
        }
        if p.sedentary_threshold <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "sedentary_threshold must be positive, got {}",
                p.sedentary_threshold
            )));
        }

        let t = &self.thresholds;
        let ordered = 0.0 <= t.medium_risk && t.medium_risk <= t.high_risk && t.high_risk <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidValue(format!(
                "tier thresholds must satisfy 0 <= medium_risk ({}) <= high_risk ({}) <= 1",
                t.medium_risk, t.high_risk
            )));
        }

        let confidence_ordered = 0.0 <= t.confidence_low
            && t.confidence_low <= t.confidence_high
            && t.confidence_high <= 1.0;
        if !confidence_ordered {
            return Err(ConfigError::InvalidValue(format!(
                "confidence bounds must satisfy 0 <= confidence_low ({}) <= confidence_high ({}) <= 1",
                t.confidence_low, t.confidence_high
            )));
        }

        if self.advisor.max_tokens == 0 {
            return Err(ConfigError::InvalidValue(
                "advisor.max_tokens must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tier classifier selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path to a logistic model in JSON form
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

/// Recommendation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorSettings {
    /// Messages endpoint
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on a single request
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
    /// Value of the `anthropic-version` header
    pub api_version: String,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::InvalidValue(e) => write!(f, "Invalid value: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
