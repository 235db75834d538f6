use std::sync::Arc;

use async_trait::async_trait;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::routes;
use crate::config::{AuthConfig, DEFAULT_JWT_SECRET};
use crate::contract::client::AuthApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::domain::token::TokenCodec;
use crate::gateways::local::AuthLocalClient;
use crate::infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmUsersRepository};

pub const MODULE_NAME: &str = "auth";

/// Credential module: owns the `users` table and publishes [`AuthApi`].
#[derive(Default)]
pub struct Auth {
    service: arc_swap::ArcSwapOption<Service>,
}

#[async_trait]
impl Module for Auth {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing auth module");

        let cfg: AuthConfig = ctx.module_config()?;
        debug!(token_ttl = ?cfg.token_ttl, email_pattern = %cfg.email_pattern, "Loaded auth config");
        if cfg.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("auth.jwt_secret is not set; using the built-in development key");
        }

        let db = ctx.db_required()?;
        let repo = SeaOrmUsersRepository::new(db);
        let tokens = TokenCodec::new(&cfg.jwt_secret, cfg.token_ttl);
        let service = Arc::new(Service::new(
            Arc::new(repo),
            tokens,
            ServiceConfig::new(&cfg.email_pattern)?,
        ));

        self.service.store(Some(service.clone()));

        let api: Arc<dyn AuthApi> = Arc::new(AuthLocalClient::new(service));
        ctx.client_hub().register::<dyn AuthApi>(api);
        info!("AuthApi exposed to ClientHub");
        Ok(())
    }
}

#[async_trait]
impl DbModule for Auth {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running auth database migrations");
        Migrator::up(db, None).await?;
        Ok(())
    }
}

impl RestfulModule for Auth {
    fn register_rest(&self, _ctx: &ModuleCtx, router: axum::Router) -> anyhow::Result<axum::Router> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("auth service not initialized"))?;
        let router = routes::register_routes(router, service)?;
        info!("Auth REST routes registered");
        Ok(router)
    }
}
