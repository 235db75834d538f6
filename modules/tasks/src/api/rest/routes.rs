use std::sync::Arc;

use auth::contract::client::AuthApi;
use axum::{
    routing::{get, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mounts `/api/tasks` and `/api/tasks/{id}`. Every route authenticates its
/// caller through `auth_api`.
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    auth_api: Arc<dyn AuthApi>,
) -> anyhow::Result<Router> {
    let tasks = Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .layer(Extension(service))
        .layer(Extension(auth_api));

    Ok(router.merge(tasks))
}
