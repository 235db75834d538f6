use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{NewTask, Task, TaskPatch, TaskQuery};

/// REST DTO for task representation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskReq {
    pub title: String,
}

/// Fields absent from the body are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskReq {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// `GET /api/tasks` query string. `priority` is accepted and not applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    pub search: Option<String>,
    pub priority: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageDto {
    pub message: String,
}

impl From<Task> for TaskDto {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            title: t.title,
            completed: t.completed,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<CreateTaskReq> for NewTask {
    fn from(req: CreateTaskReq) -> Self {
        Self { title: req.title }
    }
}

impl From<UpdateTaskReq> for TaskPatch {
    fn from(req: UpdateTaskReq) -> Self {
        Self {
            title: req.title,
            completed: req.completed,
        }
    }
}

impl From<ListTasksQuery> for TaskQuery {
    fn from(q: ListTasksQuery) -> Self {
        Self {
            search: q.search,
            page: q.page,
            limit: q.limit,
        }
    }
}
