//! Task storage location.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{home_dir, resolve_path};

/// Storage settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Database file. `None` means `~/.todos.db`.
    pub db_path: Option<String>,
}

impl StorageSettings {
    /// Default database file name under the home directory.
    pub const DEFAULT_DB: &'static str = ".todos.db";

    /// Resolved database path.
    pub fn db_path(&self) -> PathBuf {
        self.db_path_in(&home_dir())
    }

    /// Resolved database path relative to an explicit home.
    pub fn db_path_in(&self, home: &Path) -> PathBuf {
        resolve_path(self.db_path.as_deref(), home, Self::DEFAULT_DB)
    }
}
