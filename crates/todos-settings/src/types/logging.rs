//! Log output settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::Level;

use super::{home_dir, resolve_path};
use crate::errors::{Result, SettingsError};

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level: `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Per-target overrides, e.g. `{"todos_store": "debug"}`.
    pub module_levels: BTreeMap<String, String>,
    /// JSON log file. `None` means `~/.todos/todos.log`.
    pub file_path: Option<String>,
    /// Also keep WARN and above in the SQLite failure journal.
    pub persist_warnings: bool,
    /// Log database. `None` means `~/.todos/logs.db`.
    pub log_db_path: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            module_levels: BTreeMap::new(),
            file_path: None,
            persist_warnings: true,
            log_db_path: None,
        }
    }
}

impl LoggingSettings {
    /// Log file, relative to the home directory.
    pub const DEFAULT_FILE: &'static str = ".todos/todos.log";
    /// Failure journal, relative to the home directory.
    pub const DEFAULT_DB: &'static str = ".todos/logs.db";

    /// Parsed default level.
    pub fn level(&self) -> Result<Level> {
        parse_level(&self.level, "logging.level")
    }

    /// Parsed per-target overrides, in target order.
    pub fn module_levels(&self) -> Result<Vec<(String, Level)>> {
        self.module_levels
            .iter()
            .map(|(target, raw)| {
                let level = parse_level(raw, &format!("logging.moduleLevels.{target}"))?;
                Ok((target.clone(), level))
            })
            .collect()
    }

    /// Resolved JSON log file.
    pub fn file_path(&self) -> PathBuf {
        self.file_path_in(&home_dir())
    }

    /// [`Self::file_path`] against an explicit home directory.
    pub fn file_path_in(&self, home: &Path) -> PathBuf {
        resolve_path(self.file_path.as_deref(), home, Self::DEFAULT_FILE)
    }

    /// Resolved failure journal database.
    pub fn log_db_path(&self) -> PathBuf {
        self.log_db_path_in(&home_dir())
    }

    /// [`Self::log_db_path`] against an explicit home directory.
    pub fn log_db_path_in(&self, home: &Path) -> PathBuf {
        resolve_path(self.log_db_path.as_deref(), home, Self::DEFAULT_DB)
    }
}

fn parse_level(raw: &str, key: &str) -> Result<Level> {
    raw.trim()
        .parse()
        .map_err(|_| SettingsError::invalid(key, raw, "trace, debug, info, warn or error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_level_is_info() {
        assert_eq!(LoggingSettings::default().level().unwrap(), Level::INFO);
    }

    #[test]
    fn level_is_case_insensitive() {
        let logging = LoggingSettings {
            level: "WARN".into(),
            ..Default::default()
        };
        assert_eq!(logging.level().unwrap(), Level::WARN);
    }

    #[test]
    fn unknown_level_rejected() {
        let logging = LoggingSettings {
            level: "loud".into(),
            ..Default::default()
        };
        assert_matches!(logging.level(), Err(SettingsError::InvalidValue { value, .. }) if value == "loud");
    }

    #[test]
    fn module_levels_parsed() {
        let mut logging = LoggingSettings::default();
        let _ = logging
            .module_levels
            .insert("todos_store".into(), "debug".into());
        let _ = logging.module_levels.insert("todos_tui".into(), "error".into());
        assert_eq!(
            logging.module_levels().unwrap(),
            vec![
                ("todos_store".to_string(), Level::DEBUG),
                ("todos_tui".to_string(), Level::ERROR),
            ]
        );
    }

    #[test]
    fn bad_module_level_names_the_key() {
        let mut logging = LoggingSettings::default();
        let _ = logging.module_levels.insert("todos_store".into(), "nope".into());
        assert_matches!(
            logging.module_levels(),
            Err(SettingsError::InvalidValue { key, .. }) if key == "logging.moduleLevels.todos_store"
        );
    }

    #[test]
    fn default_paths_live_under_dot_todos() {
        let logging = LoggingSettings::default();
        let home = Path::new("/home/ada");
        assert_eq!(
            logging.file_path_in(home),
            PathBuf::from("/home/ada/.todos/todos.log")
        );
        assert_eq!(
            logging.log_db_path_in(home),
            PathBuf::from("/home/ada/.todos/logs.db")
        );
    }
}
