//! Process-wide context tying the note store to the AI features.
//!
//! A `Notebook` is built once at startup with an explicitly constructed
//! provider client and then serves every request. Nothing here holds
//! cross-request state beyond the store itself.

use std::sync::Arc;

use anyhow::Result;

use crate::analytics;
use crate::chat::NoteChat;
use crate::llm::LlmClient;
use crate::models::{AnalyticsSnapshot, NewNote, Note, NoteId, NoteUpdate, SummaryAndTags, UserId};
use crate::service::NoteService;
use crate::summarizer::NoteSummarizer;

/// Note store plus the injected language-generation client.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use notely::{Database, NoteService, Notebook};
/// use notely::llm::OllamaClientBuilder;
///
/// # fn example() -> anyhow::Result<()> {
/// let client = OllamaClientBuilder::new().model("gemma3:4b").build()?;
/// let notebook = Notebook::new(NoteService::new(Database::in_memory()?), Arc::new(client));
///
/// let owner = notebook.service().get_or_create_user("ada")?;
/// notebook.create_note(owner, "Trip", "Lisbon, 4-9 May")?;
/// println!("{}", notebook.answer_from_notes(owner, "When am I travelling?")?);
/// # Ok(())
/// # }
/// ```
pub struct Notebook {
    service: NoteService,
    chat: NoteChat,
    summarizer: NoteSummarizer,
}

impl Notebook {
    /// Creates a notebook; `client` is shared by chat and summarization.
    pub fn new(service: NoteService, client: Arc<dyn LlmClient>) -> Self {
        Self {
            service,
            chat: NoteChat::new(Arc::clone(&client)),
            summarizer: NoteSummarizer::new(client),
        }
    }

    /// Returns the underlying note service for plain CRUD.
    pub fn service(&self) -> &NoteService {
        &self.service
    }

    /// Computes a fresh analytics snapshot over `owner`'s notes.
    pub fn compute_analytics(&self, owner: UserId) -> Result<AnalyticsSnapshot> {
        analytics::compute_analytics(&self.service, owner)
    }

    /// Answers `question` from `owner`'s notes.
    ///
    /// # Errors
    ///
    /// Only when the notes cannot be loaded; provider failures resolve to the
    /// chat fallback text.
    pub fn answer_from_notes(&self, owner: UserId, question: &str) -> Result<String> {
        self.chat.answer_from_notes(&self.service, owner, question)
    }

    /// Generates a summary and tags for arbitrary note text. Never fails.
    pub fn generate_summary_and_tags(&self, title: &str, description: &str) -> SummaryAndTags {
        self.summarizer.summarize(title, description)
    }

    /// Creates a note with an AI-generated summary and tags.
    ///
    /// The title is validated before the provider is called, so a rejected
    /// note costs no generation request.
    pub fn create_note(&self, owner: UserId, title: &str, description: &str) -> Result<Note> {
        if title.trim().is_empty() {
            anyhow::bail!("Note title cannot be empty");
        }

        let generated = self.generate_summary_and_tags(title, description);
        let new_note = NewNote::new(title, description).with_summary(generated.summary, generated.tags);
        self.service.create_note(owner, &new_note)
    }

    /// Regenerates the summary and tags of an existing note and saves them.
    ///
    /// Returns `None` when the note does not exist for `owner`.
    pub fn regenerate_note(&self, owner: UserId, id: NoteId) -> Result<Option<Note>> {
        let Some(note) = self.service.get_note(owner, id)? else {
            return Ok(None);
        };

        let generated = self.generate_summary_and_tags(note.title(), note.description());
        let update = NoteUpdate {
            summary: generated.summary,
            tags: generated.tags,
            ..NoteUpdate::from(&note)
        };
        self.service.update_note(owner, id, &update)
    }
}
