//! Aggregate statistics over one user's notes.
//!
//! Everything here is a pure function of the note collection it is given.
//! Tags are compared as exact strings: `"Rust"`, `"rust"` and `" rust"` are
//! three different tags.
//!
//! Tie-breaking is explicit rather than inherited from a sort routine:
//! - tags with equal counts keep the order in which each tag was first seen
//!   while walking the notes in input order;
//! - among notes sharing the latest `created_at`, the first one in input
//!   order is reported as the recent note.

use std::collections::HashMap;

use anyhow::Result;
use tracing::debug;

use crate::models::{AnalyticsSnapshot, Note, RecentNote, TagCount, UserId};
use crate::service::NoteStore;

/// Maximum number of entries in [`AnalyticsSnapshot::top_tags`].
pub const TOP_TAGS_LIMIT: usize = 5;

/// Loads `owner`'s notes from `store` and summarizes them.
///
/// # Errors
///
/// Propagates store failures unchanged; the computation itself cannot fail.
pub fn compute_analytics<S>(store: &S, owner: UserId) -> Result<AnalyticsSnapshot>
where
    S: NoteStore + ?Sized,
{
    let notes = store.find_by_owner(owner)?;
    let snapshot = compute_snapshot(&notes);
    debug!(
        owner = owner.get(),
        total_notes = snapshot.total_notes,
        unique_tags = snapshot.unique_tags_count,
        "computed analytics"
    );
    Ok(snapshot)
}

/// Summarizes a note collection.
///
/// # Examples
///
/// ```
/// use notely::analytics::compute_snapshot;
///
/// let snapshot = compute_snapshot(&[]);
/// assert_eq!(snapshot.total_notes, 0);
/// assert!(snapshot.top_tags.is_empty());
/// assert!(snapshot.recent_note.is_none());
/// ```
pub fn compute_snapshot(notes: &[Note]) -> AnalyticsSnapshot {
    let frequencies = tag_frequencies(notes);

    AnalyticsSnapshot {
        total_notes: notes.len(),
        unique_tags_count: frequencies.len(),
        top_tags: rank_tags(frequencies, TOP_TAGS_LIMIT),
        recent_note: most_recent(notes).map(|note| RecentNote {
            title: note.title().to_string(),
            summary: note.summary().to_string(),
            created_at: note.created_at(),
        }),
    }
}

/// Counts every tag occurrence, listing tags in first-seen order.
pub fn tag_frequencies(notes: &[Note]) -> Vec<TagCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in notes.iter().flat_map(|note| note.tags()) {
        match index.get(tag.as_str()) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(tag.as_str(), counts.len());
                counts.push(TagCount::new(tag.clone(), 1));
            }
        }
    }

    counts
}

/// Orders tag counts by descending count and keeps the first `limit`.
///
/// The sort is stable, so equal counts stay in their incoming order.
pub fn rank_tags(mut frequencies: Vec<TagCount>, limit: usize) -> Vec<TagCount> {
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies.truncate(limit);
    frequencies
}

/// Returns the note with the latest `created_at`; the earliest in input order wins ties.
pub fn most_recent(notes: &[Note]) -> Option<&Note> {
    notes.iter().fold(None, |best: Option<&Note>, note| match best {
        Some(current) if note.created_at() <= current.created_at() => Some(current),
        _ => Some(note),
    })
}
