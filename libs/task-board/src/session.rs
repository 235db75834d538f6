//! Login state kept in the local cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{LocalCache, TASKS_KEY, TOKEN_KEY, USER_KEY};
use crate::error::BoardError;
use crate::remote::{HttpApi, RegisteredUser};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
}

pub struct Session {
    api: Arc<HttpApi>,
    cache: Arc<dyn LocalCache>,
}

impl Session {
    pub fn new(api: Arc<HttpApi>, cache: Arc<dyn LocalCache>) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> Arc<HttpApi> {
        self.api.clone()
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, BoardError> {
        self.api.register(name, email, password).await
    }

    /// Stores the token and a display name taken from the email local part.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, BoardError> {
        let token = self.api.login(email, password).await?;
        let user = SessionUser {
            name: email.split('@').next().unwrap_or_default().to_string(),
        };
        let user_json =
            serde_json::to_string(&user).map_err(|e| BoardError::cache(e.to_string()))?;

        self.cache.set(TOKEN_KEY, &token)?;
        self.cache.set(USER_KEY, &user_json)?;
        self.api.set_token(Some(token));
        info!(user = %user.name, "Logged in");
        Ok(user)
    }

    /// Picks up a token stored by an earlier [`login`](Self::login).
    pub fn restore(&self) -> Result<Option<SessionUser>, BoardError> {
        let Some(token) = self.cache.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        self.api.set_token(Some(token));
        Ok(Some(self.current_user()?.unwrap_or_else(|| SessionUser {
            name: "User".to_string(),
        })))
    }

    pub fn current_user(&self) -> Result<Option<SessionUser>, BoardError> {
        let Some(raw) = self.cache.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed user entry");
                Ok(None)
            }
        }
    }

    /// Clears the token, the user and the task cache.
    pub fn logout(&self) -> Result<(), BoardError> {
        self.api.set_token(None);
        for key in [TOKEN_KEY, USER_KEY, TASKS_KEY] {
            self.cache.remove(key)?;
        }
        info!("Logged out");
        Ok(())
    }
}
