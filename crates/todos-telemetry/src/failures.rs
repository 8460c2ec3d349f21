//! Failure journal.
//!
//! WARN and ERROR events land in a `failures` table keyed by the task and
//! operation they concern, so `todos failures --task 12` can answer what
//! went wrong with a task after the UI has gone.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use tracing::field::{Field, Visit};
use tracing::{span, Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::TelemetryError;

const SCHEMA: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    CREATE TABLE IF NOT EXISTS failures (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        recorded_at TEXT NOT NULL,
        level       TEXT NOT NULL CHECK (level IN ('WARN', 'ERROR')),
        operation   TEXT,
        task_id     INTEGER,
        error_kind  TEXT,
        message     TEXT NOT NULL,
        detail      TEXT,
        target      TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_failures_task ON failures(task_id);
";

const INSERT: &str = "
    INSERT INTO failures (recorded_at, level, operation, task_id, error_kind, message, detail, target)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

// NULL parameters disable their filter.
const RECENT: &str = "
    SELECT id, recorded_at, level, operation, task_id, error_kind, message, detail, target
    FROM failures
    WHERE (?1 IS NULL OR task_id = ?1)
      AND (?2 IS NULL OR operation = ?2)
    ORDER BY id DESC
    LIMIT ?3";

/// One journaled WARN or ERROR event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// Row id. Larger is newer.
    pub id: i64,
    /// RFC 3339, UTC, microseconds.
    pub recorded_at: String,
    /// `WARN` or `ERROR`.
    pub level: String,
    /// Innermost span when the event fired, e.g. `toggle`.
    pub operation: Option<String>,
    /// Task the operation was working on.
    pub task_id: Option<i64>,
    /// Machine-readable error class, e.g. `corrupt_row`.
    pub error_kind: Option<String>,
    /// Event message.
    pub message: String,
    /// The event's `error` field.
    pub detail: Option<String>,
    /// Module that emitted the event.
    pub target: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<5} {}",
            self.recorded_at,
            self.level,
            self.operation.as_deref().unwrap_or("-")
        )?;
        if let Some(id) = self.task_id {
            write!(f, " task {id}")?;
        }
        if let Some(kind) = &self.error_kind {
            write!(f, " [{kind}]")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Which failures [`FailureLog::recent`] returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureFilter {
    /// Only failures concerning this task.
    pub task_id: Option<i64>,
    /// Only failures raised inside this operation.
    pub operation: Option<String>,
    /// Row cap.
    pub limit: u32,
}

impl Default for FailureFilter {
    fn default() -> Self {
        Self {
            task_id: None,
            operation: None,
            limit: 50,
        }
    }
}

/// A failure before it has a row id.
#[derive(Debug)]
struct NewFailure {
    recorded_at: String,
    level: &'static str,
    operation: Option<&'static str>,
    task_id: Option<i64>,
    error_kind: Option<String>,
    message: String,
    detail: Option<String>,
    target: String,
}

/// SQLite file holding the `failures` table.
#[derive(Debug)]
pub struct FailureLog {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl FailureLog {
    /// Open or create the journal at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, TelemetryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            // Connection::open reports it if this did not work
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path).map_err(|e| db_error(path, e))?;
        conn.execute_batch(SCHEMA).map_err(|e| db_error(path, e))?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Where the journal lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, failure: &NewFailure) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        let _ = conn.prepare_cached(INSERT)?.execute(params![
            failure.recorded_at,
            failure.level,
            failure.operation,
            failure.task_id,
            failure.error_kind,
            failure.message,
            failure.detail,
            failure.target,
        ])?;
        Ok(())
    }

    /// Newest first.
    pub fn recent(&self, filter: &FailureFilter) -> Result<Vec<Failure>, TelemetryError> {
        let conn = self.conn.lock();
        let query = || -> rusqlite::Result<Vec<Failure>> {
            let mut stmt = conn.prepare_cached(RECENT)?;
            let rows = stmt.query_map(
                params![filter.task_id, filter.operation, filter.limit],
                row_to_failure,
            )?;
            rows.collect()
        };
        query().map_err(|e| db_error(&self.path, e))
    }
}

fn db_error(path: &Path, source: rusqlite::Error) -> TelemetryError {
    TelemetryError::FailureLog {
        path: path.to_path_buf(),
        source,
    }
}

fn row_to_failure(row: &Row<'_>) -> rusqlite::Result<Failure> {
    Ok(Failure {
        id: row.get("id")?,
        recorded_at: row.get("recorded_at")?,
        level: row.get("level")?,
        operation: row.get("operation")?,
        task_id: row.get("task_id")?,
        error_kind: row.get("error_kind")?,
        message: row.get("message")?,
        detail: row.get("detail")?,
        target: row.get("target")?,
    })
}

/// Writes WARN and ERROR events to a [`FailureLog`].
///
/// The operation is the innermost span's name. The task id comes from the
/// event's own `task_id` field, else from the nearest span that has one.
pub struct FailureLayer {
    log: Arc<FailureLog>,
}

impl FailureLayer {
    /// Journal into `log`.
    pub fn new(log: Arc<FailureLog>) -> Self {
        Self { log }
    }
}

/// The event and span fields the journal has columns for.
#[derive(Default)]
struct FailureFields {
    message: Option<String>,
    task_id: Option<i64>,
    error_kind: Option<String>,
    detail: Option<String>,
}

impl FailureFields {
    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            // `task_id = %id` and `task_id = 3` both arrive as text here
            "task_id" => self.task_id = value.parse().ok(),
            "error_kind" => self.error_kind = Some(value),
            "error" => self.detail = Some(value),
            _ => {}
        }
    }
}

impl Visit for FailureFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.set(field, value.to_string());
    }
}

/// Span extension: the task a span was opened for.
struct TaskScope(i64);

impl<S> Layer<S> for FailureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut fields = FailureFields::default();
        attrs.record(&mut fields);
        if let (Some(task_id), Some(span)) = (fields.task_id, ctx.span(id)) {
            span.extensions_mut().insert(TaskScope(task_id));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > Level::WARN {
            return;
        }

        let mut fields = FailureFields::default();
        event.record(&mut fields);

        let mut operation = None;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                operation = operation.or(Some(span.name()));
                if fields.task_id.is_none() {
                    fields.task_id = span.extensions().get::<TaskScope>().map(|t| t.0);
                }
            }
        }

        let failure = NewFailure {
            recorded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: metadata.level().as_str(),
            operation,
            task_id: fields.task_id,
            error_kind: fields.error_kind,
            message: fields.message.unwrap_or_default(),
            detail: fields.detail,
            target: metadata.target().to_string(),
        };
        // Logging the failure would re-enter this layer.
        let _ = self.log.record(&failure);
    }
}
