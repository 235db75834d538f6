use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::TasksConfig;
use crate::contract::model::{NewTask, Task, TaskPatch, TaskQuery};
use crate::domain::error::DomainError;
use crate::domain::repo::TasksRepository;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_title_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        TasksConfig::default().into()
    }
}

impl From<TasksConfig> for ServiceConfig {
    fn from(c: TasksConfig) -> Self {
        Self {
            default_page_size: c.default_page_size,
            max_page_size: c.max_page_size,
            max_title_length: c.max_title_length,
        }
    }
}

/// Owner-scoped task operations over the repository.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn TasksRepository>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn TasksRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "tasks.service.create", skip(self, new_task), fields(owner_id = %owner_id))]
    pub async fn create_task(&self, owner_id: Uuid, new_task: NewTask) -> Result<Task, DomainError> {
        let title = self.validate_title(&new_task.title)?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id,
            title,
            completed: false,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(task.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    #[instrument(name = "tasks.service.list", skip(self, query), fields(owner_id = %owner_id))]
    pub async fn list_tasks(&self, owner_id: Uuid, query: TaskQuery) -> Result<Vec<Task>, DomainError> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(DomainError::validation("page", "must be at least 1"));
        }
        let limit = query.limit.unwrap_or(self.config.default_page_size);
        if limit == 0 {
            return Err(DomainError::validation("limit", "must be at least 1"));
        }
        let limit = limit.min(self.config.max_page_size);
        let offset = u64::from(page - 1) * u64::from(limit);

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let tasks = self
            .repo
            .list_owned(owner_id, search.as_deref(), u64::from(limit), offset)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        debug!(page, limit, found = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    #[instrument(name = "tasks.service.update", skip(self, patch), fields(owner_id = %owner_id, task_id = %id))]
    pub async fn update_task(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, DomainError> {
        let title = patch
            .title
            .as_deref()
            .map(|t| self.validate_title(t))
            .transpose()?;

        let mut task = self
            .repo
            .find_owned(owner_id, id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::task_not_found(id))?;

        if patch.is_empty() {
            debug!("Empty patch, returning current task");
            return Ok(task);
        }

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();

        self.repo
            .update(task.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(completed = task.completed, "Updated task");
        Ok(task)
    }

    /// Idempotent: reports whether a row was removed.
    #[instrument(name = "tasks.service.delete", skip(self), fields(owner_id = %owner_id, task_id = %id))]
    pub async fn delete_task(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let deleted = self
            .repo
            .delete_owned(owner_id, id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        if deleted {
            info!("Deleted task");
        } else {
            debug!("Delete matched no task");
        }
        Ok(deleted)
    }

    fn validate_title(&self, title: &str) -> Result<String, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > self.config.max_title_length {
            return Err(DomainError::TitleTooLong {
                len,
                max: self.config.max_title_length,
            });
        }
        Ok(title.to_string())
    }
}
