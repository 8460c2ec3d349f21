//! # todos-tui
//!
//! Terminal front-end. [`Presenter`] holds the UI state and turns key events
//! into [`TaskStore`](todos_store::TaskStore) calls, [`ui::render`] draws it
//! with ratatui, and [`run`] owns the terminal for the lifetime of the
//! session.

#![deny(unsafe_code)]

pub mod presenter;
pub mod terminal;
pub mod ui;

pub use presenter::{Action, Focus, Presenter, StatusMessage, Target};
pub use terminal::run;
