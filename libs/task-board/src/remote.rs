//! HTTP access to the TaskFlow API.

use async_trait::async_trait;
use modkit::{Problem, TracedClient};
use parking_lot::RwLock;
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::BoardError;
use crate::model::{RemoteTask, TaskUpdate};

/// Task endpoints used by the board. All calls act as the logged-in user.
#[async_trait]
pub trait TasksRemote: Send + Sync {
    async fn list(&self, page: u32, limit: u32) -> Result<Vec<RemoteTask>, BoardError>;
    async fn create(&self, title: &str) -> Result<RemoteTask, BoardError>;
    async fn update(&self, id: Uuid, update: &TaskUpdate) -> Result<RemoteTask, BoardError>;
    async fn delete(&self, id: Uuid) -> Result<(), BoardError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct ListParams {
    page: u32,
    limit: u32,
}

/// Client for the TaskFlow REST API with an optional bearer token.
pub struct HttpApi {
    client: TracedClient,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(TracedClient::default(), base_url)
    }

    pub fn with_client(client: TracedClient, mut base_url: Url) -> Self {
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            token: RwLock::new(None),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, BoardError> {
        let req = self
            .request(Method::POST, "api/auth/register")?
            .json(&RegisterBody {
                name,
                email,
                password,
            });
        self.json(req).await
    }

    /// Returns the bearer token; does not store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, BoardError> {
        let req = self
            .request(Method::POST, "api/auth/login")?
            .json(&LoginBody { email, password });
        let body: TokenBody = self.json(req).await?;
        Ok(body.token)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BoardError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BoardError::validation(format!("bad url '{path}': {e}")))?;
        let mut req = self.client.request(method, url.as_str());
        if let Some(token) = self.token.read().as_deref() {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, BoardError> {
        let resp = self.client.send(req).await?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(status, error = %e, "Failed to read error body");
                String::new()
            }
        };
        let detail = serde_json::from_str::<Problem>(&text)
            .map(|p| p.detail)
            .unwrap_or(text);
        tracing::debug!(status, %detail, "API call failed");
        Err(BoardError::from_status(status, detail))
    }

    async fn json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BoardError> {
        Ok(self.send(req).await?.json::<T>().await?)
    }
}

#[async_trait]
impl TasksRemote for HttpApi {
    async fn list(&self, page: u32, limit: u32) -> Result<Vec<RemoteTask>, BoardError> {
        let req = self
            .request(Method::GET, "api/tasks")?
            .query(&ListParams { page, limit });
        self.json(req).await
    }

    async fn create(&self, title: &str) -> Result<RemoteTask, BoardError> {
        let req = self
            .request(Method::POST, "api/tasks")?
            .json(&CreateBody { title });
        self.json(req).await
    }

    async fn update(&self, id: Uuid, update: &TaskUpdate) -> Result<RemoteTask, BoardError> {
        let req = self
            .request(Method::PUT, &format!("api/tasks/{id}"))?
            .json(update);
        self.json(req).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), BoardError> {
        let req = self.request(Method::DELETE, &format!("api/tasks/{id}"))?;
        self.send(req).await?;
        Ok(())
    }
}
