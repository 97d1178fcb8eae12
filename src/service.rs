use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Params, Row};
use time::OffsetDateTime;
use tracing::info;

use crate::{Database, NewNote, Note, NoteBuilder, NoteId, NoteUpdate, UserId};

/// Read access to a user's complete note collection.
///
/// This is the seam the analytics and chat procedures read through, so they
/// can be exercised against an in-memory store or a failing one in tests.
pub trait NoteStore {
    /// Returns every note owned by `owner` in retrieval order (oldest insert first).
    fn find_by_owner(&self, owner: UserId) -> Result<Vec<Note>>;
}

const NOTE_COLUMNS: &str = "id, user_id, title, description, summary, created_at, updated_at";

/// Service layer providing note management operations.
///
/// NoteService owns a Database instance and provides the owner-scoped
/// operations behind the CLI: users, note CRUD and full-collection reads.
/// A note that exists but belongs to another user is treated exactly like a
/// note that does not exist.
///
/// # Examples
///
/// ```
/// use notely::{Database, NewNote, NoteService};
///
/// # fn main() -> anyhow::Result<()> {
/// let service = NoteService::new(Database::in_memory()?);
/// let owner = service.get_or_create_user("ada")?;
///
/// let note = service.create_note(owner, &NewNote::new("Groceries", "milk, eggs"))?;
/// assert_eq!(service.list_notes(owner)?, vec![note]);
/// # Ok(())
/// # }
/// ```
pub struct NoteService {
    db: Database,
}

impl NoteService {
    /// Creates a new NoteService with the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Useful for testing or advanced operations that need direct database access.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the ID for `username`, registering the user on first use.
    ///
    /// Leading and trailing whitespace is ignored.
    pub fn get_or_create_user(&self, username: &str) -> Result<UserId> {
        let username = username.trim();
        if username.is_empty() {
            bail!("Username cannot be empty");
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            [username],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM users WHERE username = ?1",
            [username],
            |row| row.get(0),
        )?;

        Ok(UserId::new(id))
    }

    /// Looks up a registered user without creating one.
    pub fn find_user(&self, username: &str) -> Result<Option<UserId>> {
        let id = self
            .db
            .connection()
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                [username.trim()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        Ok(id.map(UserId::new))
    }

    /// Creates a new note for `owner`.
    ///
    /// The note row and its tags are written in one transaction. Both
    /// timestamps are set to the current time.
    ///
    /// # Errors
    ///
    /// Fails if the title is empty or whitespace-only, or on database errors.
    pub fn create_note(&self, owner: UserId, new_note: &NewNote) -> Result<Note> {
        validate_title(&new_note.title)?;
        let now = now_millis();

        let id = self.in_transaction(|conn| {
            conn.execute(
                "INSERT INTO notes (user_id, title, description, summary, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                (
                    owner.get(),
                    &new_note.title,
                    &new_note.description,
                    &new_note.summary,
                    now,
                ),
            )?;
            let id = conn.last_insert_rowid();
            insert_tags(conn, id, &new_note.tags)?;
            Ok(id)
        })?;

        info!(note_id = id, owner = owner.get(), "note created");

        let timestamp = from_millis(now)?;
        Ok(NoteBuilder::new()
            .id(NoteId::new(id))
            .owner(owner)
            .title(new_note.title.clone())
            .description(new_note.description.clone())
            .summary(new_note.summary.clone())
            .tags(new_note.tags.clone())
            .created_at(timestamp)
            .updated_at(timestamp)
            .build())
    }

    /// Retrieves one of `owner`'s notes.
    ///
    /// Returns `None` if no such note exists or it belongs to another user.
    pub fn get_note(&self, owner: UserId, id: NoteId) -> Result<Option<Note>> {
        let rows = self.read_rows(
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND user_id = ?2"),
            (id.get(), owner.get()),
        )?;

        match rows.into_iter().next() {
            Some(row) => {
                let tags = self.tags_for_note(row.id)?;
                Ok(Some(row.into_note(tags)?))
            }
            None => Ok(None),
        }
    }

    /// Lists `owner`'s notes, newest first.
    ///
    /// Notes created in the same millisecond are ordered by descending ID.
    pub fn list_notes(&self, owner: UserId) -> Result<Vec<Note>> {
        self.notes_for_owner(owner, "created_at DESC, id DESC")
    }

    /// Replaces every mutable field of one of `owner`'s notes.
    ///
    /// `created_at` is preserved and `updated_at` is bumped. Returns `None`
    /// when the note does not exist for this owner.
    pub fn update_note(&self, owner: UserId, id: NoteId, update: &NoteUpdate) -> Result<Option<Note>> {
        validate_title(&update.title)?;
        let now = now_millis();

        let changed = self.in_transaction(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET title = ?1, description = ?2, summary = ?3, updated_at = ?4
                 WHERE id = ?5 AND user_id = ?6",
                (
                    &update.title,
                    &update.description,
                    &update.summary,
                    now,
                    id.get(),
                    owner.get(),
                ),
            )?;
            if changed > 0 {
                conn.execute("DELETE FROM note_tags WHERE note_id = ?1", [id.get()])?;
                insert_tags(conn, id.get(), &update.tags)?;
            }
            Ok(changed)
        })?;

        if changed == 0 {
            return Ok(None);
        }

        info!(note_id = id.get(), owner = owner.get(), "note updated");
        self.get_note(owner, id)
    }

    /// Deletes one of `owner`'s notes together with its tags.
    ///
    /// Returns `false` when the note does not exist for this owner.
    pub fn delete_note(&self, owner: UserId, id: NoteId) -> Result<bool> {
        let deleted = self.db.connection().execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            (id.get(), owner.get()),
        )?;

        if deleted > 0 {
            info!(note_id = id.get(), owner = owner.get(), "note deleted");
        }
        Ok(deleted > 0)
    }

    fn notes_for_owner(&self, owner: UserId, order_by: &str) -> Result<Vec<Note>> {
        let rows = self.read_rows(
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1 ORDER BY {order_by}"),
            [owner.get()],
        )?;
        let mut tags = self.tags_for_owner(owner)?;

        rows.into_iter()
            .map(|row| {
                let note_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_note(note_tags)
            })
            .collect()
    }

    fn read_rows(&self, sql: &str, params: impl Params) -> Result<Vec<NoteRow>> {
        let mut stmt = self.db.connection().prepare(sql)?;
        let rows = stmt.query_map(params, NoteRow::from_row)?;

        let mut notes = Vec::new();
        for row_result in rows {
            notes.push(row_result?);
        }
        Ok(notes)
    }

    fn tags_for_note(&self, note_id: i64) -> Result<Vec<String>> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT name FROM note_tags WHERE note_id = ?1 ORDER BY position")?;
        let rows = stmt.query_map([note_id], |row| row.get::<_, String>(0))?;

        let mut tags = Vec::new();
        for row_result in rows {
            tags.push(row_result?);
        }
        Ok(tags)
    }

    /// Loads the tags of every note owned by `owner` in one query.
    fn tags_for_owner(&self, owner: UserId) -> Result<HashMap<i64, Vec<String>>> {
        let mut stmt = self.db.connection().prepare(
            "SELECT nt.note_id, nt.name
             FROM note_tags nt
             JOIN notes n ON n.id = nt.note_id
             WHERE n.user_id = ?1
             ORDER BY nt.note_id, nt.position",
        )?;
        let rows = stmt.query_map([owner.get()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
        for row_result in rows {
            let (note_id, name) = row_result?;
            tags.entry(note_id).or_default().push(name);
        }
        Ok(tags)
    }

    fn in_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.db.connection();
        conn.execute("BEGIN TRANSACTION", [])?;

        match f(conn) {
            Ok(value) => {
                conn.execute("COMMIT", [])?;
                Ok(value)
            }
            Err(e) => {
                conn.execute("ROLLBACK", []).ok();
                Err(e)
            }
        }
    }
}

impl NoteStore for NoteService {
    fn find_by_owner(&self, owner: UserId) -> Result<Vec<Note>> {
        self.notes_for_owner(owner, "id ASC")
            .with_context(|| format!("Failed to load notes for user {owner}"))
    }
}

/// Raw `notes` row before its tags are attached.
struct NoteRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    summary: String,
    created_at: i64,
    updated_at: i64,
}

impl NoteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            summary: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_note(self, tags: Vec<String>) -> Result<Note> {
        Ok(NoteBuilder::new()
            .id(NoteId::new(self.id))
            .owner(UserId::new(self.user_id))
            .title(self.title)
            .description(self.description)
            .summary(self.summary)
            .tags(tags)
            .created_at(from_millis(self.created_at)?)
            .updated_at(from_millis(self.updated_at)?)
            .build())
    }
}

fn insert_tags(conn: &Connection, note_id: i64, tags: &[String]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO note_tags (note_id, position, name) VALUES (?1, ?2, ?3)")?;
    for (position, name) in tags.iter().enumerate() {
        stmt.execute((note_id, position as i64, name))?;
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Note title cannot be empty");
    }
    Ok(())
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_millis(millis: i64) -> Result<OffsetDateTime> {
    Ok(OffsetDateTime::from_unix_timestamp_nanos(
        i128::from(millis) * 1_000_000,
    )?)
}
