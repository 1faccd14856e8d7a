//! Mindvault CLI - a journal whose entry bodies are encrypted at rest.
//!
//! This is the command-line interface for Mindvault. It is the embedding
//! application of the core: it provisions the key from the environment,
//! surfaces degraded key configuration at startup, and maps core errors
//! to user-friendly messages.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use mindvault_core::storage::SqliteJournalStore;
use mindvault_core::{
    Emotion, EntryUpdate, EntryView, FieldCipher, Journal, Mood, VERSION,
};

/// Mindvault - a journal whose entry bodies are encrypted at rest
#[derive(Parser)]
#[command(name = "mindvault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the journal database
    #[arg(short, long, global = true, env = "MINDVAULT_PATH")]
    journal: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new entry
    Add {
        /// Entry body (overrides stdin/editor)
        #[arg(long)]
        text: Option<String>,

        /// Add tags to the entry
        #[arg(short, long, value_name = "TAG")]
        tag: Vec<String>,

        /// Emotion label (requires --stress; skips the classifier)
        #[arg(long)]
        emotion: Option<String>,

        /// Stress score 0-100 (requires --emotion)
        #[arg(long)]
        stress: Option<u8>,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// List the newest entries
    List {
        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search entries by tag and/or emotion (bodies are encrypted and
    /// cannot be searched)
    Search {
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,

        /// Filter by emotion label
        #[arg(long)]
        emotion: Option<String>,

        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a specific entry by ID
    Show {
        /// Entry ID
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an entry's body and/or tags
    Edit {
        /// Entry ID
        #[arg(value_name = "ID")]
        id: String,

        /// Replacement body (re-seals the entry under a fresh nonce)
        #[arg(long)]
        text: Option<String>,

        /// Replacement tags (replaces the whole list when given)
        #[arg(short, long, value_name = "TAG")]
        tag: Vec<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show key provisioning status
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Mindvault v{}", VERSION);
        println!("\nRun `mindvault --help` for usage information.");
        return Ok(());
    };

    match command {
        Commands::Add {
            text,
            tag,
            emotion,
            stress,
            no_input,
        } => {
            let mut journal = open_journal(cli.journal.as_deref(), cli.quiet)?;
            let mood = parse_mood(emotion.as_deref(), stress)?;
            let body = read_entry_text(no_input, text)?;

            let receipt = journal.create(&body, tag, Vec::new(), mood)?;
            if !cli.quiet {
                println!("Added entry {}", receipt.id);
                println!(
                    "emotion={} stress={} mood_score={}",
                    receipt.emotion, receipt.stress, receipt.mood_score
                );
            }
        }
        Commands::List { limit, json } => {
            let journal = open_journal(cli.journal.as_deref(), cli.quiet)?;
            let entries = journal.list(limit)?;
            print_entries(&entries, json, cli.quiet)?;
        }
        Commands::Search {
            tag,
            emotion,
            limit,
            json,
        } => {
            let journal = open_journal(cli.journal.as_deref(), cli.quiet)?;
            let emotion = emotion.as_deref().map(str::parse::<Emotion>).transpose()?;
            let entries = journal.search(tag, emotion, limit)?;
            print_entries(&entries, json, cli.quiet)?;
        }
        Commands::Show { id, json } => {
            let journal = open_journal(cli.journal.as_deref(), cli.quiet)?;
            let id = parse_entry_id(&id)?;
            let entry = journal
                .entry(&id)?
                .ok_or_else(|| anyhow::anyhow!("Entry not found"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                print_entry(&entry, cli.quiet);
            }
        }
        Commands::Edit { id, text, tag } => {
            let mut journal = open_journal(cli.journal.as_deref(), cli.quiet)?;
            let id = parse_entry_id(&id)?;
            let update = EntryUpdate {
                text,
                tags: if tag.is_empty() { None } else { Some(tag) },
                attachments: None,
            };
            if update.text.is_none() && update.tags.is_none() {
                return Err(anyhow::anyhow!("Nothing to edit (use --text or --tag)"));
            }
            journal.edit(&id, update)?;
            if !cli.quiet {
                println!("Updated entry {}", id);
            }
        }
        Commands::Delete { id } => {
            let mut journal = open_journal(cli.journal.as_deref(), cli.quiet)?;
            let id = parse_entry_id(&id)?;
            let removed = journal.delete(&id)?;
            if !cli.quiet {
                if removed {
                    println!("Deleted entry {}", id);
                } else {
                    println!("Entry {} did not exist", id);
                }
            }
        }
        Commands::Status => {
            let path = journal_path(cli.journal.as_deref())?;
            let cipher = build_cipher()?;
            let source = cipher.key_source();
            println!("journal: {}", path.display());
            println!("key source: {:?}", source);
            match source.warning() {
                Some(warning) => println!("warning: {}", warning),
                None => println!("key configuration: OK"),
            }
        }
    }

    Ok(())
}

fn journal_path(journal: Option<&str>) -> anyhow::Result<PathBuf> {
    journal
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("No journal path provided. Use --journal or MINDVAULT_PATH."))
}

/// Provision the cipher from `MINDVAULT_KEY` (base64 of a 256-bit key).
///
/// The raw value is held behind `SecretString` so it cannot leak through
/// Debug output on the way to the core.
fn build_cipher() -> anyhow::Result<FieldCipher> {
    let configured = std::env::var("MINDVAULT_KEY").ok().map(SecretString::from);
    let cipher = FieldCipher::from_config(configured.as_ref().map(|s| s.expose_secret()))?;
    Ok(cipher)
}

fn open_journal(
    journal: Option<&str>,
    quiet: bool,
) -> anyhow::Result<Journal<SqliteJournalStore>> {
    let path = journal_path(journal)?;
    let cipher = build_cipher()?;

    if !quiet {
        if let Some(warning) = cipher.key_source().warning() {
            eprintln!("warning: {}", warning);
        }
    }

    let store = SqliteJournalStore::open(&path)?;
    Ok(Journal::new(store, cipher))
}

fn parse_entry_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| anyhow::anyhow!("Invalid entry ID: {}", e))
}

fn parse_mood(emotion: Option<&str>, stress: Option<u8>) -> anyhow::Result<Option<Mood>> {
    match (emotion, stress) {
        (None, None) => Ok(None),
        (Some(emotion), Some(stress)) => {
            if stress > 100 {
                return Err(anyhow::anyhow!("--stress must be 0-100"));
            }
            Ok(Some(Mood {
                emotion: emotion.parse()?,
                stress,
            }))
        }
        _ => Err(anyhow::anyhow!(
            "--emotion and --stress must be given together"
        )),
    }
}

fn read_entry_text(no_input: bool, text: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = text {
        if value.trim().is_empty() {
            return Err(anyhow::anyhow!("--text cannot be empty"));
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(anyhow::anyhow!("No input provided on stdin"));
        }
        return Ok(trimmed);
    }

    if no_input {
        return Err(anyhow::anyhow!("--no-input requires content from stdin"));
    }

    read_text_from_editor()
}

fn read_text_from_editor() -> anyhow::Result<String> {
    let editor = std::env::var("EDITOR")
        .map_err(|_| anyhow::anyhow!("$EDITOR is not set; use --text or pipe content via stdin"))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let filename = format!("mindvault_entry_{}_{}.md", std::process::id(), nanos);
    let path = std::env::temp_dir().join(filename);

    std::fs::write(&path, "").map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(&path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        let _ = std::fs::remove_file(&path);
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?;
    let _ = std::fs::remove_file(&path);

    let trimmed = contents.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Entry body is empty"));
    }

    Ok(trimmed)
}

fn print_entries(entries: &[EntryView], json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if !quiet {
        println!("ID | CREATED_AT | EMOTION | STRESS | TAGS | CONTENT");
    }
    for entry in entries {
        let content = if entry.content.is_empty() {
            "(content unavailable)"
        } else {
            &entry.content
        };
        println!(
            "{} | {} | {} | {} | {} | {}",
            entry.id,
            entry.created_at,
            entry.emotion,
            entry.stress,
            entry.tags.join(","),
            content
        );
    }
    Ok(())
}

fn print_entry(entry: &EntryView, quiet: bool) {
    if !quiet {
        println!("ID: {}", entry.id);
        println!("Created: {}", entry.created_at);
        if let Some(edited_at) = entry.edited_at {
            println!("Edited: {}", edited_at);
        }
        println!(
            "Emotion: {} (stress {}, mood {})",
            entry.emotion, entry.stress, entry.mood_score
        );
        if !entry.tags.is_empty() {
            println!("Tags: {}", entry.tags.join(", "));
        }
        if !entry.attachments.is_empty() {
            println!("Attachments: {}", entry.attachments.len());
        }
        println!();
    }
    if entry.content.is_empty() {
        println!("(content unavailable)");
    } else {
        println!("{}", entry.content);
    }
}
