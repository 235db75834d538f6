use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::TasksError,
    model::{NewTask, Task, TaskPatch, TaskQuery},
};

/// In-process API of the tasks module. Every call is scoped to `owner_id`.
#[async_trait]
pub trait TasksApi: Send + Sync {
    async fn create_task(&self, owner_id: Uuid, new_task: NewTask) -> Result<Task, TasksError>;

    async fn list_tasks(&self, owner_id: Uuid, query: TaskQuery) -> Result<Vec<Task>, TasksError>;

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, TasksError>;

    /// Returns whether a row was removed; absence is not an error.
    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<bool, TasksError>;
}
