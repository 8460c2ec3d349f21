//! In-process [`TaskStore`] with the same semantics as the SQLite one.

use mockable::{Clock, DefaultClock};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use todos_core::{
    next_updated_at, truncate_to_micros, validate_description, Task, TaskId, TaskPriority,
    TaskStatus,
};

use crate::error::StoreError;
use crate::store::TaskStore;

#[derive(Default)]
struct MemoryState {
    tasks: Vec<Task>,
    last_id: i64,
}

/// Vec-backed store. Ids come from a counter that never goes back, matching
/// `AUTOINCREMENT`.
pub struct MemoryTaskStore<C: Clock = DefaultClock> {
    state: Mutex<MemoryState>,
    clock: C,
}

impl MemoryTaskStore {
    /// Empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(DefaultClock)
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryTaskStore<C> {
    /// Empty store reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
        }
    }

    fn update<F>(&self, id: TaskId, next: F) -> Option<Task>
    where
        F: FnOnce(TaskStatus) -> TaskStatus,
    {
        let mut state = self.state.lock();
        let task = state.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = next(task.status);
        task.updated_at = next_updated_at(task.updated_at, self.clock.utc());
        Some(task.clone())
    }
}

impl<C: Clock> TaskStore for MemoryTaskStore<C> {
    #[instrument(skip_all, fields(priority = %priority))]
    fn add(&self, description: &str, priority: TaskPriority) -> Result<Task, StoreError> {
        let description = validate_description(description)?;
        let now = truncate_to_micros(self.clock.utc());

        let mut state = self.state.lock();
        state.last_id += 1;
        let task = Task {
            id: TaskId::new(state.last_id),
            description,
            status: TaskStatus::Pending,
            priority,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        debug!(task_id = %task.id, "task added");
        Ok(task)
    }

    fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let state = self.state.lock();
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.state.lock().tasks.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Option<Task>, StoreError> {
        Ok(self.update(id, |_| status))
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn toggle(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.update(id, TaskStatus::toggled))
    }

    #[instrument(skip(self), fields(task_id = %id))]
    fn remove(&self, id: TaskId) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        Ok(state.tasks.len() < before)
    }
}
