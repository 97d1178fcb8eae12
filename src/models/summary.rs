use serde::{Deserialize, Serialize};

/// Summary text and tags produced for a note.
///
/// Deserializes leniently from provider output: a missing field becomes
/// empty rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryAndTags {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SummaryAndTags {
    /// Creates a new pair.
    pub fn new(summary: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            summary: summary.into(),
            tags,
        }
    }

    /// The pair with an empty summary and no tags.
    pub fn empty() -> Self {
        Self::default()
    }
}
