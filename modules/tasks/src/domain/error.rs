use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Task not found: {id}")]
    TaskNotFound { id: Uuid },

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long: {len} characters (max {max})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn task_not_found(id: Uuid) -> Self {
        Self::TaskNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
