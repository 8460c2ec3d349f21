//! Connection ownership and schema provisioning.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::schema;

/// Owned SQLite connection for the todos file.
/// Uses `parking_lot::Mutex` so stores holding it stay `Sync`.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Open or create a database at the given path and provision the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let unavailable = |detail: String| StoreError::StorageUnavailable {
            path: path.display().to_string(),
            detail,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| unavailable(format!("create dir: {e}")))?;
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;

        conn.execute_batch(schema::PRAGMAS)
            .map_err(|e| unavailable(format!("pragmas: {e}")))?;

        provision(&conn)?;

        info!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_owned(),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::StorageUnavailable {
            path: ":memory:".to_string(),
            detail: e.to_string(),
        })?;

        provision(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Execute a closure with the database connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Path the database was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the connection.
    pub fn close(self) -> Result<(), StoreError> {
        let path = self.path;
        self.conn
            .into_inner()
            .close()
            .map_err(|(_, e)| StoreError::Query(format!("close: {e}")))?;
        info!(path = %path.display(), "database closed");
        Ok(())
    }
}

/// Create the `todos` table if it is absent, otherwise check its columns.
fn provision(conn: &Connection) -> Result<(), StoreError> {
    if table_exists(conn)? {
        debug!(table = schema::TABLE, "table present, verifying columns");
        return verify_columns(conn);
    }

    conn.execute_batch(schema::CREATE_TABLE)
        .map_err(|e| StoreError::SchemaInit(format!("create {}: {e}", schema::TABLE)))?;
    info!(table = schema::TABLE, "schema created");
    Ok(())
}

fn table_exists(conn: &Connection) -> Result<bool, StoreError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [schema::TABLE],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::SchemaInit(format!("table check: {e}")))?;
    Ok(count > 0)
}

fn verify_columns(conn: &Connection) -> Result<(), StoreError> {
    let schema_err = |e: rusqlite::Error| StoreError::SchemaInit(format!("table_info: {e}"));

    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(schema_err)?;
    let columns: Vec<String> = stmt
        .query_map([schema::TABLE], |row| row.get(0))
        .map_err(schema_err)?
        .collect::<Result<_, _>>()
        .map_err(schema_err)?;

    let missing: Vec<&str> = schema::REQUIRED_COLUMNS
        .into_iter()
        .filter(|required| !columns.iter().any(|c| c == required))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::SchemaInit(format!(
            "{} table is missing columns: {}",
            schema::TABLE,
            missing.join(", ")
        )))
    }
}
