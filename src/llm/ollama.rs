use serde_json::Value;
use tracing::debug;

use super::client::{LlmClient, LlmError, http_client, normalize_base_url};

/// Host used when neither the builder nor `OLLAMA_HOST` names one.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Model used when neither the builder nor `OLLAMA_MODEL` names one.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Builder for constructing `OllamaClient` instances.
///
/// # Examples
///
/// ```
/// use notely::llm::OllamaClientBuilder;
///
/// let client = OllamaClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .model("gemma3:4b")
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct OllamaClientBuilder {
    base_url: Option<String>,
    model: Option<String>,
}

impl OllamaClientBuilder {
    /// Creates a new `OllamaClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Ollama API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model name (e.g. "gemma3:4b").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `OllamaClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, this method will check the `OLLAMA_HOST`
    /// environment variable, then fall back to [`DEFAULT_OLLAMA_HOST`].
    ///
    /// If `model()` was not called, this method will check the `OLLAMA_MODEL`
    /// environment variable, then fall back to [`DEFAULT_OLLAMA_MODEL`].
    pub fn build(self) -> Result<OllamaClient, LlmError> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var("OLLAMA_HOST").ok().filter(|h| !h.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());

        let model = self
            .model
            .or_else(|| std::env::var("OLLAMA_MODEL").ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());

        Ok(OllamaClient {
            client: http_client()?,
            base_url: normalize_base_url(&base_url)?,
            model,
        })
    }
}

/// HTTP client for a local Ollama server.
///
/// It should be constructed using `OllamaClientBuilder`.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LlmClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let request_body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();
        let body = response.text().map_err(LlmError::from_reqwest)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %body, "ollama request failed");
            return Err(LlmError::Http {
                status: status.as_u16(),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(LlmError::Serialization)?;
        response_text(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Extracts the "response" field from an Ollama generate response.
fn response_text(json: &Value) -> Result<String, LlmError> {
    if let Some(message) = json.get("error").and_then(Value::as_str) {
        return Err(LlmError::Api {
            message: message.to_string(),
        });
    }

    json.get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::Api {
            message: "Missing 'response' field in API response".to_string(),
        })
}
