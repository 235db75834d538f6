use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{AuthToken, Credentials, NewUser, Principal, User};
use crate::domain::error::DomainError;
use crate::domain::model::StoredUser;
use crate::domain::password;
use crate::domain::repo::UsersRepository;
use crate::domain::token::TokenCodec;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub email_pattern: Regex,
}

impl ServiceConfig {
    pub fn new(email_pattern: &str) -> anyhow::Result<Self> {
        let email_pattern = Regex::new(email_pattern)
            .map_err(|e| anyhow::anyhow!("invalid email_pattern '{email_pattern}': {e}"))?;
        Ok(Self { email_pattern })
    }
}

/// Registration, login and token checks over the users repository.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    tokens: TokenCodec,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, tokens: TokenCodec, config: ServiceConfig) -> Self {
        Self {
            repo,
            tokens,
            config,
        }
    }

    #[instrument(name = "auth.service.register", skip_all, fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        let name = new_user.name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        if new_user.password.is_empty() {
            return Err(DomainError::EmptyPassword);
        }
        let email = normalize_email(&new_user.email);
        if !self.config.email_pattern.is_match(&email) {
            return Err(DomainError::invalid_email(email));
        }

        if self
            .repo
            .email_exists(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::email_already_exists(email));
        }

        let password_hash = blocking(move || password::hash_password(&new_user.password)).await?;
        let user = StoredUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        let inserted = self
            .repo
            .insert(user.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !inserted {
            // A concurrent registration took the email after the check above.
            debug!("Email taken during insert");
            return Err(DomainError::email_already_exists(user.email));
        }

        info!(user_id = %user.id, "Registered user");
        Ok(user.into())
    }

    #[instrument(name = "auth.service.login", skip_all)]
    pub async fn login(&self, credentials: Credentials) -> Result<AuthToken, DomainError> {
        let email = normalize_email(&credentials.email);
        let Some(user) = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        else {
            debug!("Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let matches =
            blocking(move || password::verify_password(&credentials.password, &hash)).await?;
        if !matches {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let (token, expires_at) = self.tokens.issue(user.id, &user.name, Utc::now())?;
        info!(user_id = %user.id, "Issued token");
        Ok(AuthToken { token, expires_at })
    }

    #[instrument(name = "auth.service.authenticate", skip_all)]
    pub fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        self.tokens.verify(token).inspect_err(|e| {
            debug!(error = %e, "Rejected token");
        })
    }
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
