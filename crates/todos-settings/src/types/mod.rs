//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a partial
//! JSON file fills the missing fields from [`Default`].

mod logging;
mod storage;
mod ui;

pub use logging::*;
pub use storage::*;
pub use ui::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Root settings type.
///
/// Loaded from `~/.todos/settings.json`. Example:
///
/// ```json
/// {
///   "storage": { "dbPath": "~/notes/todos.db" },
///   "ui": { "defaultFilter": "High" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Where tasks are stored.
    pub storage: StorageSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// Terminal UI behaviour.
    pub ui: UiSettings,
}

impl Settings {
    /// Check values that serde alone cannot reject.
    pub fn validate(&self) -> Result<()> {
        let _ = self.logging.level()?;
        let _ = self.logging.module_levels()?;
        let _ = self.ui.default_filter()?;
        Ok(())
    }
}

/// Home directory from `$HOME`, `/tmp` when unset.
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
}

/// Resolve an optional configured path against `home`.
///
/// `None` gives `home/default_rel`. A leading `~/` is expanded; relative
/// paths are taken as-is.
pub fn resolve_path(configured: Option<&str>, home: &Path, default_rel: &str) -> PathBuf {
    match configured {
        None => home.join(default_rel),
        Some(raw) => match raw.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None if raw == "~" => home.to_path_buf(),
            None => PathBuf::from(raw),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
