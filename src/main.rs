use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use notely::config::default_username;
use notely::{
    AnalyticsSnapshot, Config, Note, NoteId, NoteService, NoteUpdate, Notebook, UserId, analytics,
};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::EnvFilter;

/// notely - personal notes with AI summaries, analytics and note-grounded chat
#[derive(Parser)]
#[command(name = "notely")]
#[command(about = "Personal notes with AI summaries, analytics and note-grounded chat")]
#[command(version)]
struct Cli {
    /// User whose notes to work with (defaults to the login name)
    #[arg(short, long, global = true, env = "NOTELY_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Create a note; summary and tags are generated by the AI provider
    Add(AddCommand),
    /// List notes, newest first
    List(OutputFormat),
    /// Show a single note
    Show(ShowCommand),
    /// Replace fields of a note
    Update(UpdateCommand),
    /// Delete a note
    Delete(NoteRef),
    /// Regenerate a note's summary and tags
    Regenerate(NoteRef),
    /// Show tag and note statistics
    Analytics(OutputFormat),
    /// Ask a question answered from your notes
    Ask(AskCommand),
    /// Generate a summary and tags without saving a note
    Summarize(AddCommand),
}

#[derive(Args)]
struct AddCommand {
    /// The note title
    #[arg(value_name = "TITLE")]
    title: String,

    /// The note body
    #[arg(short, long, value_name = "TEXT", default_value = "")]
    description: String,
}

#[derive(Args)]
struct OutputFormat {
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NoteRef {
    /// The note ID
    #[arg(value_name = "ID")]
    id: i64,
}

#[derive(Args)]
struct ShowCommand {
    #[command(flatten)]
    note: NoteRef,

    #[command(flatten)]
    format: OutputFormat,
}

#[derive(Args)]
struct UpdateCommand {
    #[command(flatten)]
    note: NoteRef,

    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New body
    #[arg(long)]
    description: Option<String>,

    /// New summary
    #[arg(long)]
    summary: Option<String>,

    /// Comma-separated replacement tags (empty string clears them)
    #[arg(long, value_name = "TAGS")]
    tags: Option<String>,
}

#[derive(Args)]
struct AskCommand {
    /// The question
    #[arg(value_name = "QUESTION")]
    question: String,
}

fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Sends `tracing` output to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures and references to notes that
/// don't exist. Everything else (database, I/O, configuration) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = format!("{error:#}");
    error_msg.contains("cannot be empty") || error_msg.contains("not found")
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let service = NoteService::new(config.open_database()?);

    let username = cli.user.unwrap_or_else(default_username);
    let owner = service
        .get_or_create_user(&username)
        .with_context(|| format!("Failed to resolve user '{username}'"))?;

    match cli.command {
        Commands::List(format) => execute_list(&service, owner, format.json),
        Commands::Show(cmd) => execute_show(&service, owner, &cmd),
        Commands::Update(cmd) => execute_update(&service, owner, &cmd),
        Commands::Delete(cmd) => execute_delete(&service, owner, NoteId::new(cmd.id)),
        Commands::Analytics(format) => execute_analytics(&service, owner, format.json),
        Commands::Add(cmd) => execute_add(&open_notebook(service, &config)?, owner, &cmd),
        Commands::Regenerate(cmd) => {
            execute_regenerate(&open_notebook(service, &config)?, owner, NoteId::new(cmd.id))
        }
        Commands::Ask(cmd) => execute_ask(&open_notebook(service, &config)?, owner, &cmd.question),
        Commands::Summarize(cmd) => execute_summarize(&open_notebook(service, &config)?, &cmd),
    }
}

/// Builds the provider client only for commands that need it.
fn open_notebook(service: NoteService, config: &Config) -> Result<Notebook> {
    Ok(Notebook::new(service, config.build_client()?))
}

fn execute_add(notebook: &Notebook, owner: UserId, cmd: &AddCommand) -> Result<()> {
    let note = notebook
        .create_note(owner, &cmd.title, &cmd.description)
        .context("Failed to create note")?;

    print!("Note created (id: {})", note.id());
    if !note.tags().is_empty() {
        print!(" with tags: {}", note.tags().join(", "));
    }
    println!();
    Ok(())
}

fn execute_list(service: &NoteService, owner: UserId, json: bool) -> Result<()> {
    let notes = service.list_notes(owner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else if notes.is_empty() {
        println!("No notes yet.");
    } else {
        let blocks: Vec<String> = notes.iter().map(render_note).collect();
        println!("{}", blocks.join("\n\n"));
    }
    Ok(())
}

fn execute_show(service: &NoteService, owner: UserId, cmd: &ShowCommand) -> Result<()> {
    let id = NoteId::new(cmd.note.id);
    let Some(note) = service.get_note(owner, id)? else {
        bail!("Note {id} not found");
    };

    if cmd.format.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("{}", render_note(&note));
        if !note.description().is_empty() {
            println!("\n{}", note.description());
        }
    }
    Ok(())
}

fn execute_update(service: &NoteService, owner: UserId, cmd: &UpdateCommand) -> Result<()> {
    let id = NoteId::new(cmd.note.id);
    let Some(existing) = service.get_note(owner, id)? else {
        bail!("Note {id} not found");
    };

    let update = apply_overrides(NoteUpdate::from(&existing), cmd);
    match service.update_note(owner, id, &update)? {
        Some(note) => {
            println!("Note updated (id: {})", note.id());
            Ok(())
        }
        None => bail!("Note {id} not found"),
    }
}

fn execute_delete(service: &NoteService, owner: UserId, id: NoteId) -> Result<()> {
    if !service.delete_note(owner, id)? {
        bail!("Note {id} not found");
    }
    println!("Note deleted (id: {id})");
    Ok(())
}

fn execute_regenerate(notebook: &Notebook, owner: UserId, id: NoteId) -> Result<()> {
    match notebook.regenerate_note(owner, id)? {
        Some(note) => {
            println!("{}", render_note(&note));
            Ok(())
        }
        None => bail!("Note {id} not found"),
    }
}

fn execute_analytics(service: &NoteService, owner: UserId, json: bool) -> Result<()> {
    let snapshot = analytics::compute_analytics(service, owner)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_analytics(&snapshot));
    }
    Ok(())
}

fn execute_ask(notebook: &Notebook, owner: UserId, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Question cannot be empty");
    }
    println!("{}", notebook.answer_from_notes(owner, question)?);
    Ok(())
}

fn execute_summarize(notebook: &Notebook, cmd: &AddCommand) -> Result<()> {
    let result = notebook.generate_summary_and_tags(&cmd.title, &cmd.description);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Overlays the fields given on the command line onto the stored values.
fn apply_overrides(mut update: NoteUpdate, cmd: &UpdateCommand) -> NoteUpdate {
    if let Some(title) = &cmd.title {
        update.title = title.clone();
    }
    if let Some(description) = &cmd.description {
        update.description = description.clone();
    }
    if let Some(summary) = &cmd.summary {
        update.summary = summary.clone();
    }
    if let Some(tags) = &cmd.tags {
        update.tags = parse_tags(tags);
    }
    update
}

/// Parses comma-separated tags from a string.
///
/// Splits on commas, trims whitespace from each tag, and filters out empty strings.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn format_timestamp(timestamp: time::OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

fn render_note(note: &Note) -> String {
    let mut out = format!(
        "[{}] {}\n  created: {}",
        note.id(),
        note.title(),
        format_timestamp(note.created_at())
    );
    if !note.summary().is_empty() {
        out.push_str(&format!("\n  summary: {}", note.summary()));
    }
    if !note.tags().is_empty() {
        out.push_str(&format!("\n  tags: {}", note.tags().join(", ")));
    }
    out
}

fn render_analytics(snapshot: &AnalyticsSnapshot) -> String {
    let mut out = format!(
        "Total notes: {}\nUnique tags: {}\n",
        snapshot.total_notes, snapshot.unique_tags_count
    );

    if snapshot.top_tags.is_empty() {
        out.push_str("Top tags: none\n");
    } else {
        out.push_str("Top tags:\n");
        for (rank, entry) in snapshot.top_tags.iter().enumerate() {
            out.push_str(&format!("  {}. {} ({})\n", rank + 1, entry.tag, entry.count));
        }
    }

    match &snapshot.recent_note {
        Some(recent) => out.push_str(&format!(
            "Most recent: {} ({})\n",
            recent.title,
            format_timestamp(recent.created_at)
        )),
        None => out.push_str("Most recent: none\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use notely::{NoteBuilder, RecentNote, TagCount};
    use time::macros::datetime;

    #[test]
    fn parse_tags_with_whitespace() {
        let result = parse_tags(" rust , learning ");
        assert_eq!(result, vec!["rust", "learning"]);
    }

    #[test]
    fn parse_tags_with_empty_elements() {
        let result = parse_tags("rust,,learning,");
        assert_eq!(result, vec!["rust", "learning"]);
    }

    #[test]
    fn parse_tags_empty_string_clears() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags("  ,  ,  ").is_empty());
    }

    #[test]
    fn user_errors_are_classified() {
        assert!(is_user_error(&anyhow::anyhow!("Note title cannot be empty")));
        assert!(is_user_error(&anyhow::anyhow!("Note 4 not found")));
        assert!(!is_user_error(&anyhow::anyhow!("database is locked")));
    }

    #[test]
    fn user_error_is_found_beneath_context() {
        let error = anyhow::anyhow!("Note title cannot be empty").context("Failed to create note");
        assert!(is_user_error(&error));
    }

    #[test]
    fn apply_overrides_only_touches_given_fields() {
        let base = NoteUpdate {
            title: "old".to_string(),
            description: "body".to_string(),
            summary: "sum".to_string(),
            tags: vec!["a".to_string()],
        };
        let cmd = UpdateCommand {
            note: NoteRef { id: 1 },
            title: Some("new".to_string()),
            description: None,
            summary: None,
            tags: Some("x, y".to_string()),
        };

        let update = apply_overrides(base, &cmd);
        assert_eq!(update.title, "new");
        assert_eq!(update.description, "body");
        assert_eq!(update.summary, "sum");
        assert_eq!(update.tags, vec!["x", "y"]);
    }

    #[test]
    fn render_note_includes_summary_and_tags() {
        let note = NoteBuilder::new()
            .id(NoteId::new(3))
            .owner(UserId::new(1))
            .title("Trip")
            .summary("Lisbon in May.")
            .tags(vec!["travel".to_string(), "lisbon".to_string()])
            .created_at(datetime!(2024-05-01 09:30 UTC))
            .build();

        assert_eq!(
            render_note(&note),
            "[3] Trip\n  created: 2024-05-01T09:30:00Z\n  summary: Lisbon in May.\n  tags: travel, lisbon"
        );
    }

    #[test]
    fn render_analytics_for_empty_snapshot() {
        assert_eq!(
            render_analytics(&AnalyticsSnapshot::default()),
            "Total notes: 0\nUnique tags: 0\nTop tags: none\nMost recent: none\n"
        );
    }

    #[test]
    fn render_analytics_lists_ranked_tags() {
        let snapshot = AnalyticsSnapshot {
            total_notes: 3,
            unique_tags_count: 3,
            top_tags: vec![TagCount::new("a", 2), TagCount::new("b", 1)],
            recent_note: Some(RecentNote {
                title: "Latest".to_string(),
                summary: String::new(),
                created_at: datetime!(2024-01-02 00:00 UTC),
            }),
        };

        let rendered = render_analytics(&snapshot);
        assert!(rendered.contains("  1. a (2)\n  2. b (1)\n"));
        assert!(rendered.ends_with("Most recent: Latest (2024-01-02T00:00:00Z)\n"));
    }
}
