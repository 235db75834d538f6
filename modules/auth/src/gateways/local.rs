use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::AuthApi,
    error::AuthError,
    model::{AuthToken, Credentials, NewUser, Principal, User},
};
use crate::domain::service::Service;

/// In-process [`AuthApi`] delegating to the domain service.
pub struct AuthLocalClient {
    service: Arc<Service>,
}

impl AuthLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AuthApi for AuthLocalClient {
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        self.service.register(new_user).await.map_err(Into::into)
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthToken, AuthError> {
        self.service.login(credentials).await.map_err(Into::into)
    }

    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        self.service.authenticate(token).map_err(Into::into)
    }
}
