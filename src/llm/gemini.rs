use serde_json::Value;
use tracing::debug;

use super::client::{LlmClient, LlmError, http_client, normalize_base_url};

/// Model used when neither the builder nor `GEMINI_MODEL` names one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use notely::llm::{GeminiClientBuilder, LlmClient};
///
/// let client = GeminiClientBuilder::new()
///     .api_key("test-key")
///     .model("gemini-2.5-flash")
///     .build()
///     .expect("Failed to create client");
///
/// assert_eq!(client.model(), "gemini-2.5-flash");
/// ```
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl GeminiClientBuilder {
    /// Creates a new `GeminiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model name (e.g. "gemini-2.5-flash").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the `GeminiClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `api_key()` was not called, `GEMINI_API_KEY` is used. If `model()`
    /// was not called, `GEMINI_MODEL` is used, then [`DEFAULT_GEMINI_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` when no key is available and
    /// `LlmError::InvalidUrl` for an unparseable base URL.
    pub fn build(self) -> Result<GeminiClient, LlmError> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey("GEMINI_API_KEY"))?;

        let model = self
            .model
            .or_else(|| std::env::var("GEMINI_MODEL").ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let base_url = normalize_base_url(
            self.base_url
                .as_deref()
                .unwrap_or(DEFAULT_GEMINI_BASE_URL),
        )?;

        Ok(GeminiClient {
            client: http_client()?,
            api_key,
            model,
            base_url,
        })
    }
}

/// Client for Google's Gemini `generateContent` API.
///
/// It should be constructed using `GeminiClientBuilder`.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl LlmClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .map_err(LlmError::from_reqwest)?;

        let status = response.status();
        let body = response.text().map_err(LlmError::from_reqwest)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %body, "gemini request failed");
            return Err(LlmError::Http {
                status: status.as_u16(),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(LlmError::Serialization)?;
        candidate_text(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pulls the answer text out of a `generateContent` response.
///
/// The text of every part of the first candidate is concatenated.
fn candidate_text(json: &Value) -> Result<String, LlmError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array);

    let Some(parts) = parts else {
        let message = match json.pointer("/promptFeedback/blockReason").and_then(Value::as_str) {
            Some(reason) => format!("Prompt blocked: {reason}"),
            None => "Missing candidate text in API response".to_string(),
        };
        return Err(LlmError::Api { message });
    };

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        return Err(LlmError::Api {
            message: "Missing candidate text in API response".to_string(),
        });
    }
    Ok(text)
}
