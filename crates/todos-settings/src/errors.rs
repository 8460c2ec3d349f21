//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Why `~/.todos/settings.json` could not become a [`crate::Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// Settings file that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Not JSON, or a key holds the wrong JSON type.
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    /// A key holds a string outside its accepted set.
    #[error("{key}: {value:?} is not one of {expected}")]
    InvalidValue {
        /// Dotted path of the key, e.g. `ui.defaultFilter`.
        key: String,
        /// The rejected value as written.
        value: String,
        /// Human-readable list of accepted values.
        expected: &'static str,
    },
}

impl SettingsError {
    pub(crate) fn invalid(key: impl Into<String>, value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            expected,
        }
    }

    /// Dotted key at fault, for errors that concern a single key.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { key, .. } => Some(key),
            Self::Read { .. } | Self::Json(_) => None,
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
