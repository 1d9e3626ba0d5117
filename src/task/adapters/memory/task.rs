//! In-memory task repository for tests and database-less deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    owner_index: HashMap<UserId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        state
            .owner_index
            .entry(task.owner())
            .or_default()
            .push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let slot = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        if let Some(ids) = state.owner_index.get_mut(&removed.owner()) {
            ids.retain(|task_id| *task_id != id);
            if ids.is_empty() {
                state.owner_index.remove(&removed.owner());
            }
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_active(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut active: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.is_active())
            .cloned()
            .collect();
        active.sort_by_key(Task::created_at);
        Ok(active)
    }

    async fn list_for_user(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut owned: Vec<Task> = state
            .owner_index
            .get(&owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        // Insertion order breaks ties between equal timestamps.
        owned.reverse();
        owned.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(owned)
    }

    async fn count_active_for_user(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        let state = self.state.read().map_err(lock_error)?;
        let count = state
            .owner_index
            .get(&owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id))
                    .filter(|task| task.is_active())
                    .count()
            })
            .unwrap_or_default();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
