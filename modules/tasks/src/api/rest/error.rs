use axum::http::StatusCode;
use modkit::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

fn problem(status: StatusCode, code: &str, title: &str, detail: impl Into<String>, instance: &str) -> Problem {
    Problem::new(status, title, detail)
        .with_type(format!("https://errors.taskflow.dev/{code}"))
        .with_code(code)
        .with_instance(instance)
}

pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    ProblemResponse(problem(status, code, title, detail, instance))
}

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::TaskNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "TASKS_NOT_FOUND",
            "Task not found",
            e.to_string(),
            instance,
        ),
        DomainError::EmptyTitle | DomainError::TitleTooLong { .. } => ProblemResponse(
            problem(StatusCode::BAD_REQUEST, "TASKS_VALIDATION", "Validation error", e.to_string(), instance)
                .with_field_error("/title", e.to_string()),
        ),
        DomainError::Validation { field, message } => ProblemResponse(
            problem(StatusCode::BAD_REQUEST, "TASKS_VALIDATION", "Validation error", e.to_string(), instance)
                .with_field_error(format!("/{field}"), message.clone()),
        ),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "TASKS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
