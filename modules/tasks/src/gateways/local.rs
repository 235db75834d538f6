use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::TasksApi,
    error::TasksError,
    model::{NewTask, Task, TaskPatch, TaskQuery},
};
use crate::domain::service::Service;

/// Local implementation of the tasks API that delegates to the domain service.
pub struct TasksLocalClient {
    service: Arc<Service>,
}

impl TasksLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TasksApi for TasksLocalClient {
    async fn create_task(&self, owner_id: Uuid, new_task: NewTask) -> Result<Task, TasksError> {
        self.service
            .create_task(owner_id, new_task)
            .await
            .map_err(Into::into)
    }

    async fn list_tasks(&self, owner_id: Uuid, query: TaskQuery) -> Result<Vec<Task>, TasksError> {
        self.service
            .list_tasks(owner_id, query)
            .await
            .map_err(Into::into)
    }

    async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, TasksError> {
        self.service
            .update_task(owner_id, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<bool, TasksError> {
        self.service
            .delete_task(owner_id, id)
            .await
            .map_err(Into::into)
    }
}
