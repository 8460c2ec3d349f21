//! # todos
//!
//! Terminal task tracker binary. `todos start` loads settings, installs
//! logging, opens the task database and hands it to the terminal UI.
//! `todos failures` prints what the failure journal recorded.

#![deny(unsafe_code)]

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use todos_settings::{load_settings, settings_path, Settings};
use todos_store::SqliteTaskStore;
use todos_telemetry::{init_telemetry, Failure, FailureFilter, FailureLog, TelemetryConfig};
use todos_tui::Presenter;

/// Terminal task tracker.
#[derive(Parser, Debug)]
#[command(name = "todos", version, about = "Track tasks in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Launch the interactive task list.
    Start,
    /// Print recent store failures, newest first.
    Failures {
        /// Only failures concerning this task id.
        #[arg(long)]
        task: Option<i64>,
        /// Only failures raised by this operation (add, toggle, remove, refresh).
        #[arg(long)]
        operation: Option<String>,
        /// Maximum number of failures to print.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Start => start(),
        Command::Failures {
            task,
            operation,
            limit,
        } => failures(&FailureFilter {
            task_id: task,
            operation,
            limit,
        }),
    }
}

fn settings() -> Result<Settings> {
    load_settings().with_context(|| {
        format!("Failed to load settings from {}", settings_path().display())
    })
}

fn start() -> Result<()> {
    let settings = settings()?;

    let telemetry_config =
        TelemetryConfig::from_settings(&settings.logging).context("Invalid logging settings")?;
    let _telemetry = init_telemetry(&telemetry_config).context("Failed to initialize logging")?;

    let db_path = settings.storage.db_path();
    let store = SqliteTaskStore::open(&db_path)
        .with_context(|| format!("Failed to open task database at {}", db_path.display()))?;

    let filter = settings.ui.default_filter().context("Invalid UI settings")?;
    let mut presenter = Presenter::new(store, filter)
        .context("Failed to load tasks")?
        .with_usage(settings.ui.show_usage);

    let session = todos_tui::run(&mut presenter).context("Terminal failure");
    let closed = presenter
        .into_store()
        .close()
        .context("Failed to close task database");
    session?;
    closed?;

    info!(path = %db_path.display(), "exited cleanly");
    Ok(())
}

fn failures(filter: &FailureFilter) -> Result<()> {
    let path = settings()?.logging.log_db_path();
    let rows = if path.exists() {
        FailureLog::open(&path)
            .and_then(|journal| journal.recent(filter))
            .with_context(|| format!("Failed to read failure journal at {}", path.display()))?
    } else {
        Vec::new()
    };
    print_failures(&mut io::stdout().lock(), &rows)?;
    Ok(())
}

fn print_failures(out: &mut impl Write, rows: &[Failure]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No failures recorded.");
    }
    for row in rows {
        writeln!(out, "{row}")?;
    }
    Ok(())
}
