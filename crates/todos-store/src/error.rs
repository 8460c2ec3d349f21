//! Store error type.

use todos_core::ValidationError;

/// Errors raised by task stores.
///
/// `StorageUnavailable` and `SchemaInit` only happen while opening a store
/// and are fatal at startup. Everything else is per-operation and leaves the
/// store usable.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database file could not be opened or created.
    #[error("storage unavailable at {path}: {detail}")]
    StorageUnavailable {
        /// Database path as given.
        path: String,
        /// Underlying failure.
        detail: String,
    },

    /// The `todos` table is missing and could not be created, or exists
    /// without the required columns.
    #[error("schema initialization failed: {0}")]
    SchemaInit(String),

    /// A statement failed, e.g. a locked database or a CHECK violation.
    #[error("query failed: {0}")]
    Query(String),

    /// The caller passed a description the store refuses.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored value does not decode.
    #[error("corrupt row in {table}.{column}: {detail}")]
    CorruptRow {
        /// Table name.
        table: &'static str,
        /// Offending column.
        column: &'static str,
        /// What was wrong with the value.
        detail: String,
    },
}

impl StoreError {
    /// Whether the error means the store could not be set up at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. } | Self::SchemaInit(_))
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::SchemaInit(_) => "schema_init",
            Self::Query(_) => "query",
            Self::InvalidInput(_) => "invalid_input",
            Self::CorruptRow { .. } => "corrupt_row",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::InvalidInput(e.to_string())
    }
}
