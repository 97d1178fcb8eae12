//! Analytics over notes stored in SQLite.

use anyhow::Result;
use notely::analytics::{TOP_TAGS_LIMIT, compute_analytics};
use notely::{Database, NewNote, NoteId, NoteService, TagCount};

fn set_created_at(service: &NoteService, id: NoteId, millis: i64) {
    service
        .database()
        .connection()
        .execute(
            "UPDATE notes SET created_at = ?1 WHERE id = ?2",
            (millis, id.get()),
        )
        .expect("failed to set created_at");
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

#[test]
fn analytics_over_stored_notes() -> Result<()> {
    let service = NoteService::new(Database::in_memory()?);
    let owner = service.get_or_create_user("ada")?;

    let one = service.create_note(owner, &NewNote::new("one", "").with_summary("", tags(&["a", "b"])))?;
    let two = service.create_note(owner, &NewNote::new("two", "").with_summary("", tags(&["a"])))?;
    let three = service.create_note(owner, &NewNote::new("three", "").with_summary("s", tags(&["c"])))?;

    // The middle note is the newest; insertion order must not decide.
    set_created_at(&service, one.id(), 1_000);
    set_created_at(&service, two.id(), 3_000);
    set_created_at(&service, three.id(), 2_000);

    let snapshot = compute_analytics(&service, owner)?;
    assert_eq!(snapshot.total_notes, 3);
    assert_eq!(snapshot.unique_tags_count, 3);
    assert_eq!(
        snapshot.top_tags,
        vec![TagCount::new("a", 2), TagCount::new("b", 1), TagCount::new("c", 1)]
    );

    let recent = snapshot.recent_note.unwrap();
    assert_eq!(recent.title, "two");
    assert_eq!(recent.created_at.unix_timestamp(), 3);

    Ok(())
}

#[test]
fn analytics_for_user_without_notes() -> Result<()> {
    let service = NoteService::new(Database::in_memory()?);
    let owner = service.get_or_create_user("empty")?;

    let snapshot = compute_analytics(&service, owner)?;
    assert_eq!(snapshot.total_notes, 0);
    assert_eq!(snapshot.unique_tags_count, 0);
    assert!(snapshot.top_tags.is_empty());
    assert!(snapshot.recent_note.is_none());

    let json = serde_json::to_value(&snapshot)?;
    assert_eq!(json["recentNote"], serde_json::Value::Null);
    assert_eq!(json["topTags"], serde_json::json!([]));

    Ok(())
}

#[test]
fn analytics_ignore_other_users_and_cap_top_tags() -> Result<()> {
    let service = NoteService::new(Database::in_memory()?);
    let ada = service.get_or_create_user("ada")?;
    let bob = service.get_or_create_user("bob")?;

    service.create_note(
        ada,
        &NewNote::new("many", "").with_summary("", tags(&["t1", "t2", "t3", "t4", "t5", "t6", "T1"])),
    )?;
    service.create_note(bob, &NewNote::new("bob's", "").with_summary("", tags(&["t1"])))?;

    let snapshot = compute_analytics(&service, ada)?;
    assert_eq!(snapshot.total_notes, 1);
    assert_eq!(snapshot.unique_tags_count, 7);
    assert_eq!(snapshot.top_tags.len(), TOP_TAGS_LIMIT);
    assert!(snapshot.top_tags.iter().all(|entry| entry.count == 1));
    assert_eq!(snapshot.top_tags[0].tag, "t1");

    assert_eq!(compute_analytics(&service, ada)?, snapshot);

    Ok(())
}
