//! SQLite-backed [`TaskStore`].
//!
//! Every method goes through [`Database::with_conn`]. Status changes run in
//! a transaction: read the row, compute the next status and `updated_at`,
//! write both.

use std::path::Path;

use mockable::{Clock, DefaultClock};
use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use todos_core::{
    next_updated_at, truncate_to_micros, validate_description, Task, TaskId, TaskPriority,
    TaskStatus,
};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, format_timestamp, parse_timestamp};
use crate::schema::TABLE;
use crate::store::TaskStore;

const SELECT_COLUMNS: &str = "SELECT id, task, status, priority, created_at, updated_at FROM todos";

/// Task store persisting to a single SQLite file.
pub struct SqliteTaskStore<C: Clock = DefaultClock> {
    db: Database,
    clock: C,
}

impl SqliteTaskStore {
    /// Open or create the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_clock(path, DefaultClock)
    }

    /// Private in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::in_memory_with_clock(DefaultClock)
    }
}

impl<C: Clock> SqliteTaskStore<C> {
    /// Open or create the store at `path`, reading time from `clock`.
    pub fn open_with_clock(path: &Path, clock: C) -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open(path)?,
            clock,
        })
    }

    /// Private in-memory database, reading time from `clock`.
    pub fn in_memory_with_clock(clock: C) -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::in_memory()?,
            clock,
        })
    }

    /// Location of the backing file, `:memory:` for in-memory stores.
    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Release the database handle.
    pub fn close(self) -> Result<(), StoreError> {
        self.db.close()
    }

    fn write_status(
        &self,
        conn: &Connection,
        current: Task,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        let updated_at = next_updated_at(current.updated_at, self.clock.utc());
        let _ = conn.execute(
            "UPDATE todos SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), format_timestamp(updated_at), current.id.get()],
        )?;
        debug!(from = %current.status, to = %status, "status written");
        Ok(Task {
            status,
            updated_at,
            ..current
        })
    }
}

impl<C: Clock> TaskStore for SqliteTaskStore<C> {
    #[instrument(skip_all, fields(priority = %priority))]
    fn add(&self, description: &str, priority: TaskPriority) -> Result<Task, StoreError> {
        let description = validate_description(description)?;
        let now = truncate_to_micros(self.clock.utc());
        let stamp = format_timestamp(now);

        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO todos (task, status, priority, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![
                    description,
                    TaskStatus::Pending.as_str(),
                    priority.as_str(),
                    stamp
                ],
            )?;
            let id = TaskId::new(conn.last_insert_rowid());
            info!(task_id = %id, "task added");

            Ok(Task {
                id,
                description,
                status: TaskStatus::Pending,
                priority,
                created_at: now,
                updated_at: now,
            })
        })
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| fetch_task(conn, id))
    }

    #[instrument(skip(self))]
    fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }
            Ok(tasks)
        })?;

        // Rows written by column defaults use a different text format, so
        // the SQL order is only a first pass.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        debug!(count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let Some(current) = fetch_task(&tx, id)? else {
                debug!("no such task, nothing to update");
                return Ok(None);
            };
            let updated = self.write_status(&tx, current, status)?;
            tx.commit()?;
            Ok(Some(updated))
        })
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn toggle(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let Some(current) = fetch_task(&tx, id)? else {
                debug!("no such task, nothing to toggle");
                return Ok(None);
            };
            let next = current.status.toggled();
            let updated = self.write_status(&tx, current, next)?;
            tx.commit()?;
            Ok(Some(updated))
        })
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn remove(&self, id: TaskId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id.get()])?;
            if changed > 0 {
                info!("task removed");
            } else {
                debug!("no such task, nothing to remove");
            }
            Ok(changed > 0)
        })
    }
}

fn fetch_task(conn: &Connection, id: TaskId) -> Result<Option<Task>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query(params![id.get()])?;
    match rows.next()? {
        Some(row) => row_to_task(row).map(Some),
        None => Ok(None),
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<Task, StoreError> {
    let status: String = row_helpers::get(row, 2, TABLE, "status")?;
    let priority: String = row_helpers::get(row, 3, TABLE, "priority")?;
    let created_at: String = row_helpers::get(row, 4, TABLE, "created_at")?;
    let updated_at: String = row_helpers::get(row, 5, TABLE, "updated_at")?;

    Ok(Task {
        id: TaskId::new(row_helpers::get(row, 0, TABLE, "id")?),
        description: row_helpers::get(row, 1, TABLE, "task")?,
        status: row_helpers::parse_enum(&status, TABLE, "status")?,
        priority: row_helpers::parse_enum(&priority, TABLE, "priority")?,
        created_at: parse_timestamp(&created_at, TABLE, "created_at")?,
        updated_at: parse_timestamp(&updated_at, TABLE, "updated_at")?,
    })
}
