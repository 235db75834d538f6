use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::User;

/// A user row as the domain sees it, hash included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for User {
    fn from(u: StoredUser) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}
