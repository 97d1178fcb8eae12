//! Best-effort extraction of a JSON object from free-form model output.
//!
//! Models asked for "ONLY JSON" still wrap it in prose or markdown fences.
//! This module isolates the recovery step so callers get an explicit
//! failure branch instead of inline string matching.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why no structured value could be recovered.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The text contains no `{ ... }` span at all.
    #[error("no JSON object found in model output")]
    NoJsonObject,

    /// A brace-delimited span was found but did not parse as the expected shape.
    #[error("malformed JSON object: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Returns the span from the first `{` to the last `}`, inclusive.
///
/// The match is greedy, so prose between two objects is included and the
/// span will then fail to parse.
///
/// # Examples
///
/// ```
/// use notely::extract::extract_json_object;
///
/// let raw = "Sure! ```json\n{\"summary\": \"hi\"}\n```";
/// assert_eq!(extract_json_object(raw).unwrap(), "{\"summary\": \"hi\"}");
/// ```
pub fn extract_json_object(text: &str) -> Result<&str, ExtractError> {
    let start = text.find('{').ok_or(ExtractError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ExtractError::NoJsonObject)?;

    if end < start {
        return Err(ExtractError::NoJsonObject);
    }
    Ok(&text[start..=end])
}

/// Extracts the JSON object span from `text` and deserializes it as `T`.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span = extract_json_object(text)?;
    serde_json::from_str(span).map_err(ExtractError::Malformed)
}
