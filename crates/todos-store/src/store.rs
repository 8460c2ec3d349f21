//! The [`TaskStore`] trait.
//!
//! Missing ids are not errors: [`TaskStore::remove`] returns `false` and the
//! status operations return `None`, so a caller can tell "nothing happened"
//! apart from a storage failure without handling a `NotFound` variant.

use todos_core::{Task, TaskId, TaskPriority, TaskStatus};

use crate::error::StoreError;

/// Create/list/update/delete over [`Task`] records.
pub trait TaskStore {
    /// Validate and persist a new task with status `Pending`.
    ///
    /// The stored description is the trimmed input. Blank input is rejected
    /// with [`StoreError::InvalidInput`].
    fn add(&self, description: &str, priority: TaskPriority) -> Result<Task, StoreError>;

    /// Look up one task.
    fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Every task, newest `created_at` first (ties: higher id first).
    fn get_all(&self) -> Result<Vec<Task>, StoreError>;

    /// Set the status and move `updated_at` forward. `None` if `id` is unknown.
    fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Option<Task>, StoreError>;

    /// Flip Pending/Done and move `updated_at` forward. `None` if `id` is unknown.
    fn toggle(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Hard-delete a task. Returns whether a row was removed.
    fn remove(&self, id: TaskId) -> Result<bool, StoreError>;
}
