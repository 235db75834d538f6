use std::sync::Arc;

use axum::{routing::post, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// `POST /api/auth/register`, `POST /api/auth/login`.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let auth = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .layer(Extension(service));

    Ok(router.merge(auth))
}
