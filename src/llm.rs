//! Language-generation providers.
//!
//! Every AI feature talks to the model through the [`LlmClient`] trait. A
//! client is built once from configuration and injected wherever it is
//! needed; there is no global client. Each call is a single, stateless
//! request with no retry.

mod client;
mod gemini;
mod ollama;

pub use client::{LlmClient, LlmError};
pub use gemini::{GeminiClient, GeminiClientBuilder};
pub use ollama::{OllamaClient, OllamaClientBuilder};
