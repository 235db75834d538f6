use std::sync::Arc;

use async_trait::async_trait;
use auth::contract::client::AuthApi;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::TasksConfig;
use crate::contract::client::TasksApi;
use crate::domain::service::Service;
use crate::gateways::local::TasksLocalClient;
use crate::infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmTasksRepository};

pub const MODULE_NAME: &str = "tasks";

/// Task module: owns the `tasks` table, consumes [`AuthApi`] from the hub
/// and publishes [`TasksApi`].
#[derive(Default)]
pub struct Tasks {
    service: arc_swap::ArcSwapOption<Service>,
    auth: arc_swap::ArcSwapOption<Arc<dyn AuthApi>>,
}

#[async_trait]
impl Module for Tasks {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing tasks module");

        let cfg: TasksConfig = ctx.module_config()?;
        cfg.validate()?;
        debug!(
            default_page_size = cfg.default_page_size,
            max_page_size = cfg.max_page_size,
            max_title_length = cfg.max_title_length,
            "Loaded tasks config"
        );

        let auth = ctx
            .client_hub()
            .get::<dyn AuthApi>()
            .map_err(|e| anyhow::anyhow!("tasks requires the auth module: {e}"))?;

        let db = ctx.db_required()?;
        let repo = SeaOrmTasksRepository::new(db);
        let service = Arc::new(Service::new(Arc::new(repo), cfg.into()));

        self.service.store(Some(service.clone()));
        self.auth.store(Some(Arc::new(auth)));

        let api: Arc<dyn TasksApi> = Arc::new(TasksLocalClient::new(service));
        ctx.client_hub().register::<dyn TasksApi>(api);
        info!("TasksApi exposed to ClientHub");
        Ok(())
    }
}

#[async_trait]
impl DbModule for Tasks {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running tasks database migrations");
        Migrator::up(db, None).await?;
        Ok(())
    }
}

impl RestfulModule for Tasks {
    fn register_rest(&self, _ctx: &ModuleCtx, router: axum::Router) -> anyhow::Result<axum::Router> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("tasks service not initialized"))?;
        let auth = self
            .auth
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("auth client not resolved"))?;
        let router = routes::register_routes(router, service, (*auth).clone())?;
        info!("Tasks REST routes registered");
        Ok(router)
    }
}
