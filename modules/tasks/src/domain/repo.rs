use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::Task;

/// Persistence port of the task service. Every lookup is owner-scoped.
#[async_trait]
pub trait TasksRepository: Send + Sync {
    async fn insert(&self, task: Task) -> anyhow::Result<()>;

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<Task>>;

    /// Writes title, completion and `updated_at` of an existing row.
    async fn update(&self, task: Task) -> anyhow::Result<()>;

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    /// Newest first. `search` is a lower-cased substring matched literally.
    async fn list_owned(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<Task>>;
}
