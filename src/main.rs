//! # tasktide
//!
//! Terminal task manager with recurring tasks.
//!
//! ## Usage
//!
//! ```bash
//! # Basic task
//! tasktide add "Write report" --priority high --due 2025-12-01T17:00:00
//!
//! # Recurring task
//! tasktide add "Pay rent" --due 2025-01-31 --recur monthly
//!
//! # List tasks (sorted by urgency); elapsed recurring tasks roll forward first
//! tasktide list
//!
//! # Complete a task (any unique id prefix works)
//! tasktide complete 3f2a9c
//!
//! # Roll recurring tasks forward explicitly, optionally at a given instant
//! tasktide recur --now 2025-03-01T00:00:00Z
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved in your local data directory:
//! *   Linux: `~/.local/share/tasktide/tasks.json`
//! *   macOS: `~/Library/Application Support/tasktide/tasks.json`
//! *   Windows: `%APPDATA%\tasktide\tasks.json`
//!
//! You can override this with `--db` or the `TASKS_DB` environment variable.
//! Set `RUST_LOG=tasktide=debug` to trace recurrence decisions.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tasktide::commands::*;
use tasktide::config::Config;
use tasktide::error::{Error, Result};
use tasktide::models::{Priority, Recurrence, Status};
use tasktide::recurrence::parse_due_date;
use tasktide::storage::Storage;

#[derive(Parser)]
#[command(name = "tasktide")]
#[command(about = "Terminal task manager with recurring tasks", long_about = None)]
struct Cli {
    /// Path to the tasks database file
    #[arg(long, global = true, env = "TASKS_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Priority (low, medium, high, urgent)
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date: YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS or RFC 3339
        #[arg(short, long)]
        due: Option<String>,
        /// Recurrence (none, daily, weekly, monthly)
        #[arg(short, long)]
        recur: Option<Recurrence>,
    },
    /// List tasks sorted by urgency
    List {
        /// Show completed and archived tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a task as complete
    Complete { id: String },
    /// Set a task's status (pending, in_progress, completed, archived)
    Status { id: String, status: Status },
    /// Remove a task
    Remove {
        id: String,
        /// Delete the record instead of marking it deleted
        #[arg(long)]
        purge: bool,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// New due date
        #[arg(short, long)]
        due: Option<String>,
        /// New recurrence
        #[arg(short, long)]
        recur: Option<Recurrence>,
    },
    /// Generate the next occurrence of every elapsed recurring task
    Recur {
        /// Evaluate at this instant instead of the current time
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,
    },
    /// Show task totals
    Stats,
    /// Reset the database (delete all tasks)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    parse_due_date(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

fn init_tracing() {
    // Tracing is opt-in via RUST_LOG; ignore invalid or oversized filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let storage = Storage::from_config(&Config::resolve(cli.db));
    match cli.command {
        Commands::Add { title, description, priority, due, recur } => {
            cmd_add(&storage, title, description, priority, due, recur, false).map(|_| ())
        }
        Commands::List { all } => cmd_list(&storage, all),
        Commands::Complete { id } => cmd_complete(&storage, &id, false),
        Commands::Status { id, status } => cmd_set_status(&storage, &id, status, false),
        Commands::Remove { id, purge } => cmd_remove(&storage, &id, purge, false),
        Commands::Edit { id, title, description, priority, due, recur } => {
            let edit = TaskEdit { title, description, priority, due, recurrence: recur };
            cmd_edit(&storage, &id, edit, false)
        }
        Commands::Recur { now } => cmd_recur(&storage, now.unwrap_or_else(Utc::now), false).map(|_| ()),
        Commands::Stats => cmd_stats(&storage),
        Commands::Reset { force } => cmd_reset(&storage, force),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tasktide", &mut io::stdout());
            Ok(())
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(err.exit_code());
    }
}
