//! Question answering grounded in a user's own notes.
//!
//! Notes are flattened into a plain-text context block and sent with the
//! question in a single provider call. The answer is always text: any
//! provider failure is replaced by [`FALLBACK_ANSWER`].

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::llm::LlmClient;
use crate::models::{Note, UserId};
use crate::service::NoteStore;

/// Returned in place of an answer when the provider call fails.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't generate a response.";

/// Answers questions using only the supplied notes as knowledge.
pub struct NoteChat {
    client: Arc<dyn LlmClient>,
}

impl NoteChat {
    /// Creates a responder that generates with `client`.
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Loads `owner`'s notes from `store` and answers `question` from them.
    ///
    /// # Errors
    ///
    /// Only store failures are returned. Provider failures produce
    /// [`FALLBACK_ANSWER`] instead.
    pub fn answer_from_notes<S>(&self, store: &S, owner: UserId, question: &str) -> Result<String>
    where
        S: NoteStore + ?Sized,
    {
        let notes = store.find_by_owner(owner)?;
        Ok(self.answer(&notes, question))
    }

    /// Answers `question` from `notes`, in the order given.
    ///
    /// An empty collection is valid input; the provider is still asked and
    /// is expected to say it has nothing to go on.
    pub fn answer(&self, notes: &[Note], question: &str) -> String {
        let prompt = build_prompt(notes, question);
        debug!(
            model = self.client.model(),
            note_count = notes.len(),
            prompt_len = prompt.len(),
            "sending chat prompt"
        );

        match self.client.generate(&prompt) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(model = self.client.model(), "provider returned an empty answer; using fallback");
                FALLBACK_ANSWER.to_string()
            }
            Err(e) => {
                warn!(model = self.client.model(), error = %e, "chat generation failed; using fallback");
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}

/// Renders notes as numbered three-line blocks separated by blank lines.
///
/// No sorting is applied: block `n` is the `n`th note as retrieved.
pub fn format_notes_context(notes: &[Note]) -> String {
    notes
        .iter()
        .enumerate()
        .map(|(idx, note)| {
            format!(
                "{}. Title: {}\nSummary: {}\nTags: {}",
                idx + 1,
                note.title(),
                note.summary(),
                note.tags().join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the full prompt for a question over `notes`.
///
/// Note text and the question are inserted verbatim, in a single pass.
pub fn build_prompt(notes: &[Note], question: &str) -> String {
    format!(
        "You are an AI assistant that only knows the user's notes.
Answer the user's question using the titles, summaries, and tags.
If the answer is not clearly in the notes, give a best guess based on them.
Do NOT include information outside these notes.

Notes:
{notes}

User question: {question}
Respond concisely.
Return only text.",
        notes = format_notes_context(notes),
    )
}
