use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Occurrence count of a single tag across a user's notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

impl TagCount {
    pub fn new(tag: impl Into<String>, count: usize) -> Self {
        Self {
            tag: tag.into(),
            count,
        }
    }
}

/// The headline fields of the most recently created note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentNote {
    pub title: String,
    pub summary: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Aggregate view over one user's notes.
///
/// Derived on demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_notes: usize,
    pub unique_tags_count: usize,
    /// At most five entries, highest count first.
    pub top_tags: Vec<TagCount>,
    pub recent_note: Option<RecentNote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_serializes_with_null_recent_note() {
        let json = serde_json::to_value(AnalyticsSnapshot::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalNotes": 0,
                "uniqueTagsCount": 0,
                "topTags": [],
                "recentNote": null
            })
        );
    }
}
