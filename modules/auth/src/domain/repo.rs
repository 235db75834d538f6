use async_trait::async_trait;

use crate::domain::model::StoredUser;

/// Persistence port of the credential service.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Lookup by the normalized (lower-cased) email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<StoredUser>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// `Ok(false)` when the email is already taken.
    async fn insert(&self, user: StoredUser) -> anyhow::Result<bool>;
}
