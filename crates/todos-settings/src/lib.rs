//! # todos-settings
//!
//! Configuration for the todos tracker.
//!
//! Settings are loaded from two layers:
//! 1. **Compiled defaults**: [`Settings::default()`]
//! 2. **User file**: `~/.todos/settings.json` (deep-merged over defaults)
//!
//! Paths left unset resolve under `$HOME` (`/tmp` when it is unset).

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
