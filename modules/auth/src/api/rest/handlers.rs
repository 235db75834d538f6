use std::sync::Arc;

use axum::{extract::Json, http::{StatusCode, Uri}, Extension};
use modkit::ProblemResponse;
use tracing::{info, warn};

use crate::api::rest::dto::{LoginReq, RegisterReq, TokenDto, UserDto};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

pub async fn register(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<RegisterReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Registering user: {:?}", req_body);

    match svc.register(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            warn!("Registration failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn login(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<LoginReq>,
) -> Result<Json<TokenDto>, ProblemResponse> {
    info!("Login attempt: {:?}", req_body);

    match svc.login(req_body.into()).await {
        Ok(token) => Ok(Json(TokenDto::from(token))),
        Err(e) => {
            warn!("Login failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
