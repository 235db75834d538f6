use axum::http::StatusCode;
use modkit::{Problem, ProblemResponse};

use crate::contract::error::AuthError;
use crate::domain::error::DomainError;

pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    ProblemResponse(
        Problem::new(status, title, detail)
            .with_type(format!("https://errors.taskflow.dev/{code}"))
            .with_code(code)
            .with_instance(instance),
    )
}

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::EmptyName | DomainError::EmptyPassword => from_parts(
            StatusCode::BAD_REQUEST,
            "AUTH_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidEmail { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "AUTH_INVALID_EMAIL",
            "Invalid email",
            e.to_string(),
            instance,
        ),
        DomainError::EmailAlreadyExists { .. } => from_parts(
            StatusCode::CONFLICT,
            "AUTH_EMAIL_CONFLICT",
            "Email already exists",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidCredentials | DomainError::InvalidToken { .. } => unauthorized(
            e.to_string(),
            instance,
        ),
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            tracing::error!(error = ?e, "Internal auth error");
            internal(instance)
        }
    }
}

/// Same mapping for callers that only see the contract error.
pub fn map_auth_error(e: &AuthError, instance: &str) -> ProblemResponse {
    match e {
        AuthError::Validation { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "AUTH_VALIDATION",
            "Validation error",
            message.clone(),
            instance,
        ),
        AuthError::Conflict { .. } => from_parts(
            StatusCode::CONFLICT,
            "AUTH_EMAIL_CONFLICT",
            "Email already exists",
            e.to_string(),
            instance,
        ),
        AuthError::Unauthorized { message } => unauthorized(message.clone(), instance),
        AuthError::Internal => internal(instance),
    }
}

pub fn unauthorized(detail: impl Into<String>, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::UNAUTHORIZED,
        "AUTH_UNAUTHORIZED",
        "Unauthorized",
        detail,
        instance,
    )
}

fn internal(instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::INTERNAL_SERVER_ERROR,
        "AUTH_INTERNAL",
        "Internal error",
        "An internal error occurred",
        instance,
    )
}
