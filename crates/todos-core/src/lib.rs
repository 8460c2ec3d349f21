//! # todos-core
//!
//! Data model for the task tracker: the [`Task`] record, its closed
//! [`TaskStatus`] and [`TaskPriority`] enumerations, description validation,
//! and the timestamp rules every store implementation follows.
//!
//! Nothing in this crate touches storage. Stores in `todos-store` build on
//! these types so that the SQLite store and the in-memory store agree on
//! state transitions.

#![deny(unsafe_code)]

pub mod errors;
pub mod task;
pub mod time;

pub use errors::ValidationError;
pub use task::{
    MAX_DESCRIPTION_CHARS, PriorityFilter, Task, TaskId, TaskPriority, TaskStatus,
    validate_description,
};
pub use time::{next_updated_at, truncate_to_micros};
