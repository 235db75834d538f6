//! `reqwest` wrapper that gives every outgoing call a tracing span and an
//! `x-request-id` header, so client and server log lines can be joined.

use reqwest::header::{HeaderName, HeaderValue};
use tracing::{field::Empty, Instrument, Level};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Execute a built request inside an `outgoing_http` span. An existing
    /// `x-request-id` header is kept; otherwise a fresh one is attached.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let header = HeaderName::from_static(REQUEST_ID_HEADER);
        if !req.headers().contains_key(&header) {
            let id = uuid::Uuid::new_v4().simple().to_string();
            if let Ok(v) = HeaderValue::from_str(&id) {
                req.headers_mut().insert(header.clone(), v);
            }
        }
        let request_id = req
            .headers()
            .get(&header)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let span = tracing::span!(
            Level::INFO,
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            request_id = %request_id,
            http.status_code = Empty,
            error = Empty,
        );

        let inner = self.inner.clone();
        async move {
            let response = inner.execute(req).await?;
            let status = response.status();
            let span = tracing::Span::current();
            span.record("http.status_code", status.as_u16());
            if status.is_client_error() || status.is_server_error() {
                span.record("error", true);
            }
            tracing::debug!(status = status.as_u16(), "response received");
            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Build and execute in one step.
    pub async fn send(&self, builder: reqwest::RequestBuilder) -> reqwest::Result<reqwest::Response> {
        let req = builder.build()?;
        self.execute(req).await
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.send(self.inner.get(url)).await
    }

    pub async fn delete(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.send(self.inner.delete(url)).await
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn attaches_request_id_header() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/ping").header_exists(REQUEST_ID_HEADER);
            then.status(200).body("ok");
        });

        let client = TracedClient::default();
        let resp = client.get(&server.url("/ping")).await.unwrap();

        assert!(resp.status().is_success());
        m.assert();
    }

    #[tokio::test]
    async fn keeps_caller_request_id() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/echo")
                .header(REQUEST_ID_HEADER, "fixed-id");
            then.status(204);
        });

        let client = TracedClient::default();
        let builder = client
            .request(reqwest::Method::POST, &server.url("/echo"))
            .header(REQUEST_ID_HEADER, "fixed-id");
        let resp = client.send(builder).await.unwrap();

        assert_eq!(resp.status().as_u16(), 204);
        m.assert();
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/gone");
            then.status(500);
        });

        let client = TracedClient::default();
        let resp = client.delete(&server.url("/gone")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 500);
    }
}
