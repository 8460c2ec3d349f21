//! SQL DDL for the todos database.

/// Table holding tasks.
pub const TABLE: &str = "todos";

/// Applied once, when `sqlite_master` has no `todos` table.
pub const CREATE_TABLE: &str = r"
CREATE TABLE todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN ('Pending', 'Done')),
    priority TEXT NOT NULL DEFAULT 'High' CHECK (priority IN ('High', 'Medium', 'Low')),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
";

/// Columns an existing `todos` table must have to be usable.
pub const REQUIRED_COLUMNS: [&str; 6] = ["id", "task", "status", "priority", "created_at", "updated_at"];

/// Connection settings for file databases.
pub const PRAGMAS: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
";
