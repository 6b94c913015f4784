//! HTTP client for the Messages endpoint of the recommendation service.

use crate::config::AdvisorSettings;
use crate::error::RiskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Secret API key, never persisted
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on a single request
    pub timeout: Duration,
    pub api_version: String,
}

impl AdvisorConfig {
    /// Combine file settings with an explicitly supplied API key.
    pub fn new(settings: &AdvisorSettings, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            timeout: settings.timeout,
            api_version: settings.api_version.clone(),
        }
    }
}

/// Recommendation service error types.
#[derive(Debug)]
pub enum AdvisorError {
    /// Configuration error
    Config(String),
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// JSON serialization error
    Serialization(String),
    /// Request did not complete within its time bound
    Timeout(Duration),
    /// Response carried no text block
    EmptyResponse,
}

impl std::fmt::Display for AdvisorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisorError::Config(msg) => write!(f, "Advisor config error: {msg}"),
            AdvisorError::Network(msg) => write!(f, "Advisor network error: {msg}"),
            AdvisorError::Server { status, message } => {
                write!(f, "Advisor server error ({status}): {message}")
            }
            AdvisorError::Serialization(msg) => write!(f, "Advisor serialization error: {msg}"),
            AdvisorError::Timeout(after) => {
                write!(f, "Advisor request timed out after {}s", after.as_secs_f64())
            }
            AdvisorError::EmptyResponse => write!(f, "Advisor returned no text content"),
        }
    }
}

impl std::error::Error for AdvisorError {}

impl From<AdvisorError> for RiskError {
    fn from(e: AdvisorError) -> Self {
        RiskError::external(e.to_string())
    }
}

/// One generated text with its accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Turn a raw response body into a [`Completion`].
fn parse_response(body: &str, requested_model: &str) -> Result<Completion, AdvisorError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| AdvisorError::Serialization(e.to_string()))?;

    let text = response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or(AdvisorError::EmptyResponse)?;

    Ok(Completion {
        text,
        model: response
            .model
            .unwrap_or_else(|| requested_model.to_string()),
        input_tokens: response.usage.input_tokens,
        output_tokens: response.usage.output_tokens,
        generated_at: Utc::now(),
    })
}

/// Client for the Messages endpoint.
pub struct AdvisorClient {
    config: AdvisorConfig,
    client: reqwest::Client,
}

impl AdvisorClient {
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        if config.api_key.trim().is_empty() {
            return Err(AdvisorError::Config("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a single-turn prompt and return the first text block.
    pub async fn complete(&self, prompt: &str) -> Result<Completion, AdvisorError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisorError::Timeout(self.config.timeout)
                } else {
                    AdvisorError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AdvisorError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AdvisorError::Network(e.to_string()))?;

        let completion = parse_response(&body, &self.config.model)?;
        tracing::debug!(
            model = %completion.model,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            "recommendation generated"
        );
        Ok(completion)
    }
}
