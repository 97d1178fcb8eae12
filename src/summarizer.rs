//! AI-generated summary and tags for a note.
//!
//! The provider is asked for a strict `{"summary", "tags"}` JSON object.
//! Whatever goes wrong, the caller gets a structurally valid
//! [`SummaryAndTags`]; an empty summary is a normal outcome.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::extract::{ExtractError, parse_json_object};
use crate::llm::LlmClient;
use crate::models::SummaryAndTags;

/// Summary used when the provider fails or returns unparseable JSON.
pub const NO_SUMMARY: &str = "No summary generated.";

/// Produces a summary and tags for a note's title and description.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use notely::llm::GeminiClientBuilder;
/// use notely::summarizer::NoteSummarizer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClientBuilder::new().build()?;
/// let summarizer = NoteSummarizer::new(Arc::new(client));
///
/// let result = summarizer.summarize("Trip", "Flights to Lisbon on the 4th, hotel booked.");
/// println!("{} {:?}", result.summary, result.tags);
/// # Ok(())
/// # }
/// ```
pub struct NoteSummarizer {
    client: Arc<dyn LlmClient>,
}

impl NoteSummarizer {
    /// Creates a summarizer that generates with `client`.
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Generates a summary and tags. Never fails.
    ///
    /// Outcomes by stage:
    /// - provider error: `NO_SUMMARY` with no tags
    /// - no `{...}` span in the reply: empty summary, no tags
    /// - span does not parse as `{summary, tags}`: `NO_SUMMARY` with no tags
    /// - otherwise the parsed values, with absent fields left empty
    pub fn summarize(&self, title: &str, description: &str) -> SummaryAndTags {
        let prompt = build_prompt(title, description);
        debug!(model = self.client.model(), prompt_len = prompt.len(), "requesting summary");

        let response = match self.client.generate(&prompt) {
            Ok(response) => response,
            Err(e) => {
                warn!(model = self.client.model(), error = %e, "summary generation failed; using fallback");
                return SummaryAndTags::new(NO_SUMMARY, Vec::new());
            }
        };

        interpret_response(&response)
    }
}

/// Maps a raw provider reply to a summary, applying the fallback rules.
pub fn interpret_response(response: &str) -> SummaryAndTags {
    match parse_json_object::<SummaryAndTags>(response) {
        Ok(parsed) => parsed,
        Err(ExtractError::NoJsonObject) => {
            warn!("summary response contained no JSON object; returning empty summary");
            SummaryAndTags::empty()
        }
        Err(e @ ExtractError::Malformed(_)) => {
            warn!(error = %e, "summary response was not valid JSON; using fallback");
            SummaryAndTags::new(NO_SUMMARY, Vec::new())
        }
    }
}

/// Builds the summary prompt for a note.
///
/// The title and description are inserted verbatim, in a single pass.
pub fn build_prompt(title: &str, description: &str) -> String {
    format!(
        r#"You are an AI note assistant.
Based on the title and description, generate:
1. A short summary (max 50 words)
2. 3-5 relevant tags
Return ONLY in JSON format:
{{
  "summary": "...",
  "tags": ["...", "..."]
}}

Title: {title}
Description: {description}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    struct MockLlmClient {
        response: Option<String>,
    }

    impl LlmClient for MockLlmClient {
        fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.response.clone().ok_or(LlmError::Http { status: 503 })
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    fn summarizer(response: Option<&str>) -> NoteSummarizer {
        NoteSummarizer::new(Arc::new(MockLlmClient {
            response: response.map(str::to_string),
        }))
    }

    #[test]
    fn prompt_contains_title_description_and_format() {
        let prompt = build_prompt("Trip", "Lisbon in May");

        assert!(prompt.contains("A short summary (max 50 words)"));
        assert!(prompt.contains("3-5 relevant tags"));
        assert!(prompt.contains("\"tags\": [\"...\", \"...\"]"));
        assert!(prompt.ends_with("Title: Trip\nDescription: Lisbon in May"));
    }

    #[test]
    fn placeholder_text_in_title_is_not_substituted() {
        let prompt = build_prompt("About {description}", "BODY {title}");

        assert!(prompt.ends_with("Title: About {description}\nDescription: BODY {title}"));
    }

    #[test]
    fn parses_clean_json_reply() {
        let result = summarizer(Some(r#"{"summary": "A trip.", "tags": ["travel", "lisbon", "may"]}"#))
            .summarize("Trip", "Lisbon in May");

        assert_eq!(result.summary, "A trip.");
        assert_eq!(result.tags, vec!["travel", "lisbon", "may"]);
    }

    #[test]
    fn parses_json_wrapped_in_markdown() {
        let reply = "```json\n{\n  \"summary\": \"Wrapped.\",\n  \"tags\": [\"a\"]\n}\n```";
        let result = summarizer(Some(reply)).summarize("t", "d");

        assert_eq!(result, SummaryAndTags::new("Wrapped.", vec!["a".to_string()]));
    }

    #[test]
    fn tags_are_returned_verbatim() {
        let result = summarizer(Some(r#"{"summary": "", "tags": ["Rust", " rust", "Rust"]}"#))
            .summarize("t", "d");

        assert_eq!(result.tags, vec!["Rust", " rust", "Rust"]);
    }

    #[test]
    fn reply_without_json_gives_empty_summary() {
        let result = summarizer(Some("I cannot help with that.")).summarize("t", "d");
        assert_eq!(result, SummaryAndTags::empty());
    }

    #[test]
    fn malformed_json_gives_no_summary_fallback() {
        let result = summarizer(Some(r#"{"summary": "half" "tags": }"#)).summarize("t", "d");
        assert_eq!(result, SummaryAndTags::new(NO_SUMMARY, vec![]));
    }

    #[test]
    fn wrong_shape_gives_no_summary_fallback() {
        let result = summarizer(Some(r#"{"summary": ["not", "text"], "tags": []}"#)).summarize("t", "d");
        assert_eq!(result, SummaryAndTags::new(NO_SUMMARY, vec![]));
    }

    #[test]
    fn provider_failure_gives_no_summary_fallback() {
        let result = summarizer(None).summarize("t", "d");
        assert_eq!(result.summary, NO_SUMMARY);
        assert!(result.tags.is_empty());
    }

    #[test]
    fn missing_tags_field_defaults_to_empty() {
        assert_eq!(
            interpret_response(r#"{"summary": "only a summary"}"#),
            SummaryAndTags::new("only a summary", vec![])
        );
    }
}
