use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use modkit::ProblemResponse;

use crate::api::rest::error::{map_auth_error, unauthorized};
use crate::contract::{client::AuthApi, model::Principal};

/// The authenticated caller of a request.
///
/// Requires `Extension(Arc<dyn AuthApi>)` on the route; rejects with a 401
/// problem when the `Authorization: Bearer <jwt>` header is missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let instance = parts.uri.path().to_owned();

        let Some(api) = parts.extensions.get::<Arc<dyn AuthApi>>().cloned() else {
            tracing::error!("AuthApi extension missing on an authenticated route");
            return Err(modkit::internal_error("authentication is not configured"));
        };

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| unauthorized("missing Authorization header", &instance))?
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| unauthorized("expected 'Bearer <token>'", &instance))?
            .to_owned();

        api.authenticate(&token)
            .await
            .map(AuthUser)
            .map_err(|e| map_auth_error(&e, &instance))
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
