use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{NoteId, UserId};

/// A note owned by a single user.
///
/// The `summary` and `tags` are normally produced by the summarizer when the
/// note is created, but the owner may overwrite them on update. Tags are kept
/// exactly as given: order, duplicates and case variants are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: NoteId,
    owner: UserId,
    title: String,
    description: String,
    summary: String,
    tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl Note {
    /// Returns the note ID.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the owning user.
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the free-text body.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the summary, which may be empty.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the tags in stored order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns when this note was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Returns when this note was last updated.
    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

/// Builder for constructing `Note` instances with optional fields.
///
/// # Examples
///
/// ```
/// use notely::{NoteBuilder, NoteId, UserId};
///
/// let note = NoteBuilder::new()
///     .id(NoteId::new(1))
///     .owner(UserId::new(1))
///     .title("Groceries")
///     .tags(vec!["shopping".to_string()])
///     .build();
///
/// assert_eq!(note.title(), "Groceries");
/// assert_eq!(note.summary(), "");
/// assert_eq!(note.tags(), ["shopping"]);
/// ```
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    owner: Option<UserId>,
    title: Option<String>,
    description: Option<String>,
    summary: Option<String>,
    tags: Option<Vec<String>>,
    created_at: Option<OffsetDateTime>,
    updated_at: Option<OffsetDateTime>,
}

impl NoteBuilder {
    /// Creates a new `NoteBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note ID.
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the owning user.
    pub fn owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Sets the created timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the updated timestamp.
    pub fn updated_at(mut self, updated_at: OffsetDateTime) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the `Note`, using defaults for optional fields.
    ///
    /// Missing timestamps default to now; `updated_at` defaults to
    /// `created_at` when only the latter was given.
    ///
    /// # Panics
    ///
    /// Panics if `id`, `owner` or `title` have not been set.
    pub fn build(self) -> Note {
        let created_at = self.created_at.unwrap_or_else(OffsetDateTime::now_utc);
        Note {
            id: self.id.expect("id is required"),
            owner: self.owner.expect("owner is required"),
            title: self.title.expect("title is required"),
            description: self.description.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// Fields supplied when creating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub description: String,
    pub summary: String,
    pub tags: Vec<String>,
}

impl NewNote {
    /// Creates a note draft with only a title and description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Attaches a summary and tag list.
    pub fn with_summary(mut self, summary: impl Into<String>, tags: Vec<String>) -> Self {
        self.summary = summary.into();
        self.tags = tags;
        self
    }
}

/// Replacement values for every mutable field of a note.
///
/// Updates are full-field: whatever is in here overwrites the stored note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: String,
    pub description: String,
    pub summary: String,
    pub tags: Vec<String>,
}

impl From<&Note> for NoteUpdate {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            description: note.description.clone(),
            summary: note.summary.clone(),
            tags: note.tags.clone(),
        }
    }
}
