use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("User with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for AuthError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match e {
            EmptyName | EmptyPassword | InvalidEmail { .. } => Self::validation(e.to_string()),
            EmailAlreadyExists { email } => Self::Conflict { email },
            InvalidCredentials | InvalidToken { .. } => Self::unauthorized(e.to_string()),
            Database { .. } | Internal { .. } => Self::Internal,
        }
    }
}
