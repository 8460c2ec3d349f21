//! # todos-telemetry
//!
//! Logging for an application whose terminal is owned by the UI: events go
//! to a JSON log file instead of stdout, and WARN+ events are also kept in a
//! [`FailureLog`] keyed by task and operation.

#![deny(unsafe_code)]

mod failures;

pub use failures::{Failure, FailureFilter, FailureLayer, FailureLog};

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use todos_settings::{home_dir, LoggingSettings};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level.
    pub log_level: Level,
    /// Per-target level overrides (e.g. "todos_store" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// JSON log file, appended to.
    pub log_file: PathBuf,
    /// Whether to journal WARN+ events in the failure log.
    pub record_failures: bool,
    /// Failure log database.
    pub failure_db_path: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            log_level: Level::INFO,
            module_levels: Vec::new(),
            log_file: home.join(LoggingSettings::DEFAULT_FILE),
            record_failures: true,
            failure_db_path: home.join(LoggingSettings::DEFAULT_DB),
        }
    }
}

impl TelemetryConfig {
    /// Build from the `logging` section of the settings file.
    pub fn from_settings(logging: &LoggingSettings) -> todos_settings::Result<Self> {
        Ok(Self {
            log_level: logging.level()?,
            module_levels: logging.module_levels()?,
            log_file: logging.file_path(),
            record_failures: logging.persist_warnings,
            failure_db_path: logging.log_db_path(),
        })
    }

    /// `EnvFilter` directive string, e.g. `info,todos_store=debug`.
    pub fn filter_directives(&self) -> String {
        let mut directives = self.log_level.to_string().to_lowercase();
        for (module, level) in &self.module_levels {
            directives.push(',');
            directives.push_str(module);
            directives.push('=');
            directives.push_str(&level.to_string().to_lowercase());
        }
        directives
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The JSON log file could not be created or opened for append.
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        /// Log file path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Levels from settings produced a directive `EnvFilter` rejects.
    #[error("invalid log filter {directives:?}: {detail}")]
    Filter {
        /// The rejected directive string.
        directives: String,
        /// Parser message.
        detail: String,
    },

    /// The failure journal could not be opened or read.
    #[error("failure log {}: {source}", .path.display())]
    FailureLog {
        /// Journal database path.
        path: PathBuf,
        /// SQLite error.
        #[source]
        source: rusqlite::Error,
    },

    /// Another subscriber owns the process already.
    #[error("global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Returned by [`init_telemetry`]; keep it for the life of the process.
#[derive(Debug)]
pub struct TelemetryGuard {
    failures: Option<Arc<FailureLog>>,
    log_file: PathBuf,
}

impl TelemetryGuard {
    /// The failure journal, when it is enabled and opened.
    pub fn failures(&self) -> Option<&FailureLog> {
        self.failures.as_deref()
    }

    /// Where JSON log lines are written.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Initialize the telemetry subsystem. Call once at startup.
///
/// A failure journal that cannot be opened is skipped with a logged warning.
/// A log file that cannot be opened is an error.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let file = open_log_file(&config.log_file)?;

    let directives = config.filter_directives();
    let env_filter = EnvFilter::try_new(&directives).map_err(|e| TelemetryError::Filter {
        directives: directives.clone(),
        detail: e.to_string(),
    })?;

    // JSON formatting layer for the log file
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_span_list(true)
        .with_writer(std::sync::Mutex::new(file))
        .with_filter(env_filter);

    let (failures, journal_error) = if config.record_failures {
        match FailureLog::open(&config.failure_db_path) {
            Ok(log) => (Some(Arc::new(log)), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };
    let failure_layer = failures.as_ref().map(|log| FailureLayer::new(Arc::clone(log)));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(failure_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    if let Some(e) = journal_error {
        tracing::warn!(error = %e, "failure journal unavailable, warnings will only reach the log file");
    }
    tracing::debug!(directives = %directives, "telemetry initialized");

    Ok(TelemetryGuard {
        failures,
        log_file: config.log_file.clone(),
    })
}

fn open_log_file(path: &Path) -> Result<File, TelemetryError> {
    let log_file_err = |source| TelemetryError::LogFile {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(log_file_err)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_file_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config_in(dir: &tempfile::TempDir) -> TelemetryConfig {
        TelemetryConfig {
            log_level: Level::INFO,
            module_levels: vec![("todos_store".into(), Level::DEBUG)],
            log_file: dir.path().join("logs").join("todos.log"),
            record_failures: true,
            failure_db_path: dir.path().join("logs").join("failures.db"),
        }
    }

    #[test]
    fn filter_directives_include_modules() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(config_in(&dir).filter_directives(), "info,todos_store=debug");
    }

    #[test]
    fn from_settings_resolves_levels_and_paths() {
        let logging: LoggingSettings = serde_json::from_value(serde_json::json!({
            "level": "warn",
            "moduleLevels": { "todos_tui": "trace" },
            "filePath": "/var/log/todos.log",
            "persistWarnings": false,
            "logDbPath": "/var/log/todos-logs.db"
        }))
        .unwrap();
        let config = TelemetryConfig::from_settings(&logging).unwrap();
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(config.module_levels, vec![("todos_tui".to_string(), Level::TRACE)]);
        assert_eq!(config.log_file, PathBuf::from("/var/log/todos.log"));
        assert!(!config.record_failures);
        assert_eq!(config.failure_db_path, PathBuf::from("/var/log/todos-logs.db"));
    }

    #[test]
    fn from_settings_rejects_bad_level() {
        let logging = LoggingSettings {
            level: "shout".into(),
            ..Default::default()
        };
        assert!(TelemetryConfig::from_settings(&logging).is_err());
    }

    #[test]
    fn log_file_under_regular_file_is_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = open_log_file(&file.path().join("todos.log")).unwrap_err();
        assert_matches!(err, TelemetryError::LogFile { .. });
    }

    // The only test that installs the global subscriber.
    #[test]
    fn init_writes_file_and_persists_warnings() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = config_in(&dir);
        let guard = init_telemetry(&config).unwrap();

        tracing::info!("hello file");
        {
            let _remove = tracing::info_span!("remove", task_id = %9).entered();
            tracing::warn!(error_kind = "query", "disk hiccup");
        }

        let content = std::fs::read_to_string(guard.log_file()).unwrap();
        assert!(content.contains("hello file"));
        assert!(content.contains("disk hiccup"));

        let journal = guard.failures().unwrap();
        let rows = journal
            .recent(&FailureFilter {
                task_id: Some(9),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "disk hiccup");
        assert_eq!(rows[0].operation.as_deref(), Some("remove"));
        assert_eq!(rows[0].error_kind.as_deref(), Some("query"));

        assert_matches!(
            init_telemetry(&config),
            Err(TelemetryError::AlreadyInitialized(_))
        );
    }
}
