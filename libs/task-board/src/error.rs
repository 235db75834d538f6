use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Undo window for task {id} has expired")]
    UndoExpired { id: Uuid },
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    pub(crate) fn task_not_found(id: Uuid) -> Self {
        Self::NotFound(format!("task {id}"))
    }

    /// Maps an HTTP error status (and the problem detail, when present) to
    /// the matching variant.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            400 | 413 | 422 => Self::Validation(detail),
            401 | 403 => Self::Unauthorized(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            _ => Self::Server { status, detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_taxonomy() {
        assert!(matches!(BoardError::from_status(400, "x"), BoardError::Validation(_)));
        assert!(matches!(BoardError::from_status(401, "x"), BoardError::Unauthorized(_)));
        assert!(matches!(BoardError::from_status(404, "x"), BoardError::NotFound(_)));
        assert!(matches!(BoardError::from_status(409, "x"), BoardError::Conflict(_)));
        assert!(matches!(
            BoardError::from_status(503, "down"),
            BoardError::Server { status: 503, .. }
        ));
    }
}
