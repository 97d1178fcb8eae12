mod analytics;
mod ids;
mod note;
mod summary;

pub use analytics::{AnalyticsSnapshot, RecentNote, TagCount};
pub use ids::{NoteId, UserId};
pub use note::{NewNote, Note, NoteBuilder, NoteUpdate};
pub use summary::SummaryAndTags;
