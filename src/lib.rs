pub mod analytics;
pub mod chat;
pub mod config;
pub mod db;
pub mod extract;
pub mod llm;
pub mod models;
pub mod notebook;
pub mod service;
pub mod summarizer;

pub use config::Config;
pub use db::Database;
pub use llm::{LlmClient, LlmError};
pub use models::{
    AnalyticsSnapshot, NewNote, Note, NoteBuilder, NoteId, NoteUpdate, RecentNote,
    SummaryAndTags, TagCount, UserId,
};
pub use notebook::Notebook;
pub use service::{NoteService, NoteStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let note = NoteBuilder::new()
            .id(NoteId::new(1))
            .owner(UserId::new(1))
            .title("test")
            .build();
        assert_eq!(note.title(), "test");

        let snapshot = analytics::compute_snapshot(std::slice::from_ref(&note));
        assert_eq!(snapshot.total_notes, 1);
        assert_eq!(snapshot.recent_note.map(|r| r.title), Some("test".to_string()));
    }
}
