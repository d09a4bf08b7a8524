//! Ollama narrator implementation
//!
//! Local Ollama API integration for free-form prose. The narrator is told
//! to keep every figure verbatim; the grounding engine downstream catches
//! any drift it introduces anyway.

use crate::LlmError;
use millwright_domain::Narrator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for narration requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

const PROMPT_PREAMBLE: &str = "Rewrite the following manufacturing answer outline as clear prose \
for a plant operator. Keep every number, unit, and asset name exactly as written. Do not add \
facts that are not in the outline.\n\n";

/// Narrator backed by a local Ollama instance
pub struct OllamaNarrator {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaNarrator {
    /// Create a narrator against `endpoint` using `model`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a narrator against the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Render the outline into prose via the Ollama generate API.
    ///
    /// Transient failures are retried with exponential backoff (1s, 2s,
    /// 4s, ...); a missing model fails immediately.
    pub async fn generate(&self, outline: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let request_body = GenerateRequest {
            model: self.model.clone(),
            prompt: format!("{}{}", PROMPT_PREAMBLE, outline),
            stream: false,
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return response
                            .json::<GenerateResponse>()
                            .await
                            .map(|r| r.response)
                            .map_err(|e| {
                                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                            });
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tracing::debug!(attempt = attempts, ?delay, "narration request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl Narrator for OllamaNarrator {
    type Error = LlmError;

    // Blocking bridge for the sync trait; callers already run narration on
    // a blocking thread.
    fn narrate(&self, outline: &str) -> Result<String, Self::Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
        runtime.block_on(self.generate(outline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrator_creation() {
        let narrator = OllamaNarrator::new("http://localhost:11434", "llama3").unwrap();
        assert_eq!(narrator.endpoint, "http://localhost:11434");
        assert_eq!(narrator.model, "llama3");
        assert_eq!(narrator.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_default_endpoint() {
        let narrator = OllamaNarrator::default_endpoint("mistral").unwrap();
        assert_eq!(narrator.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_with_max_retries() {
        let narrator = OllamaNarrator::default_endpoint("llama3")
            .unwrap()
            .with_max_retries(5);
        assert_eq!(narrator.max_retries, 5);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_communication_error() {
        let narrator = OllamaNarrator::new("http://127.0.0.1:9", "llama3")
            .unwrap()
            .with_max_retries(1);

        let result = narrator.generate("outline").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
