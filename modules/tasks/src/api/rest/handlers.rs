use std::sync::Arc;

use auth::AuthUser;
use axum::{
    extract::{Json, Path, Query},
    http::{StatusCode, Uri},
    Extension,
};
use modkit::ProblemResponse;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::rest::dto::{CreateTaskReq, ListTasksQuery, MessageDto, TaskDto, UpdateTaskReq};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

pub async fn create_task(
    uri: Uri,
    AuthUser(principal): AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<CreateTaskReq>,
) -> Result<(StatusCode, Json<TaskDto>), ProblemResponse> {
    match svc.create_task(principal.user_id, req_body.into()).await {
        Ok(task) => Ok((StatusCode::CREATED, Json(TaskDto::from(task)))),
        Err(e) => {
            warn!("Failed to create task: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_tasks(
    uri: Uri,
    AuthUser(principal): AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskDto>>, ProblemResponse> {
    if let Some(priority) = &query.priority {
        debug!(%priority, "Ignoring priority filter");
    }

    match svc.list_tasks(principal.user_id, query.into()).await {
        Ok(tasks) => Ok(Json(tasks.into_iter().map(TaskDto::from).collect())),
        Err(e) => {
            warn!("Failed to list tasks: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn update_task(
    uri: Uri,
    AuthUser(principal): AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateTaskReq>,
) -> Result<Json<TaskDto>, ProblemResponse> {
    match svc.update_task(principal.user_id, id, req_body.into()).await {
        Ok(task) => Ok(Json(TaskDto::from(task))),
        Err(e) => {
            warn!("Failed to update task {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_task(
    uri: Uri,
    AuthUser(principal): AuthUser,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageDto>, ProblemResponse> {
    match svc.delete_task(principal.user_id, id).await {
        Ok(_) => Ok(Json(MessageDto {
            message: "Task deleted".to_string(),
        })),
        Err(e) => {
            warn!("Failed to delete task {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
