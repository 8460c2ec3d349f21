//! Terminal UI settings.

use serde::{Deserialize, Serialize};
use todos_core::PriorityFilter;

use crate::errors::{Result, SettingsError};

/// UI settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSettings {
    /// Show the key binding panel under the task table.
    pub show_usage: bool,
    /// Filter selected at startup: `All`, `High`, `Medium` or `Low`.
    pub default_filter: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_usage: true,
            default_filter: "All".to_string(),
        }
    }
}

impl UiSettings {
    /// Parsed startup filter.
    pub fn default_filter(&self) -> Result<PriorityFilter> {
        self.default_filter.parse().map_err(|_| {
            SettingsError::invalid("ui.defaultFilter", &self.default_filter, "All, High, Medium or Low")
        })
    }
}
