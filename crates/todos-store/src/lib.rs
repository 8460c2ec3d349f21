//! # todos-store
//!
//! Durable storage for todo tasks.
//!
//! [`TaskStore`] is the seam the presenter talks to. [`SqliteTaskStore`]
//! persists to a single SQLite file and provisions the `todos` table on first
//! open; [`MemoryTaskStore`] keeps everything in process for tests.
//!
//! Both stores are the authority on status transitions: they read the
//! current status, apply [`TaskStatus::toggled`](todos_core::TaskStatus::toggled),
//! and move `updated_at` strictly forward.

#![deny(unsafe_code)]

pub mod database;
pub mod error;
pub mod memory;
pub mod row_helpers;
pub mod schema;
pub mod store;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use database::Database;
pub use error::StoreError;
pub use memory::MemoryTaskStore;
pub use store::TaskStore;
pub use tasks::SqliteTaskStore;
