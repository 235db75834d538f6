use async_trait::async_trait;

use crate::contract::{
    error::AuthError,
    model::{AuthToken, Credentials, NewUser, Principal, User},
};

/// In-process API of the auth module, published to the `ClientHub`.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError>;

    async fn login(&self, credentials: Credentials) -> Result<AuthToken, AuthError>;

    /// Validate a raw JWT (without the `Bearer ` prefix).
    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError>;
}
