use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when calling a language-generation provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Provider-specific errors, including responses without usable text
    #[error("Provider API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The provider needs an API key and none was configured
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),
}

impl LlmError {
    /// Maps a transport error, separating timeouts from other failures.
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// A text-generation provider.
///
/// Implementations own their configuration (endpoint, credentials, model)
/// and perform exactly one request per call. The trait also lets tests
/// substitute scripted or failing providers.
pub trait LlmClient: Send + Sync {
    /// Sends `prompt` and returns the provider's completion text.
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Returns the model this client generates with.
    fn model(&self) -> &str;
}

/// Request timeout for a single generation call.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection establishment timeout.
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the blocking HTTP client shared by all providers.
pub(crate) fn http_client() -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(LlmError::Network)
}

/// Validates a base URL and strips any trailing slash.
pub(crate) fn normalize_base_url(url: &str) -> Result<String, LlmError> {
    reqwest::Url::parse(url).map_err(|e| LlmError::InvalidUrl(format!("{url}: {e}")))?;
    Ok(url.trim_end_matches('/').to_string())
}
