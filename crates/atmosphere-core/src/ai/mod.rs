pub mod gemini;
pub mod ollama;
pub mod openai;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use async_trait::async_trait;
use std::time::Duration;

/// Upper bound for a single model round trip
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A single prompt, optionally constrained to a JSON schema
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
        }
    }

    pub fn json(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema: Some(schema),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("No API key configured for {0}")]
    MissingCredential(&'static str),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// A remote text generator. Returns the raw reply text, which may be empty.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) async fn error_for_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ModelError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ModelError::Status {
        provider,
        status,
        body,
    })
}
