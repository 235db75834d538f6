//! Drives a [`ModuleRegistry`] through its full lifecycle.
//!
//! One `ModuleCtx` is built up front and shared by every phase. Shutdown is
//! triggered by OS signals, an external `CancellationToken`, or any future.

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use sea_orm::DatabaseConnection;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

pub enum ShutdownOptions {
    /// Ctrl+C / SIGTERM.
    Signals,
    /// The caller owns the lifecycle through this token.
    Token(CancellationToken),
    /// Shut down when the future completes.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    pub registry: ModuleRegistry,
    /// Raw module config sections, keyed by module name.
    pub modules_cfg: Arc<dyn ConfigProvider>,
    /// `None` means modules get no database; any `DbModule` then fails.
    pub db: Option<DatabaseConnection>,
    pub shutdown: ShutdownOptions,
}

/// init → db → rest → start → wait → stop.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let RunOptions {
        registry,
        modules_cfg,
        db,
        shutdown: shutdown_opt,
    } = opts;

    let hub = Arc::new(ClientHub::default());
    let cancel = match &shutdown_opt {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match shutdown_opt {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                match shutdown::wait_for_shutdown().await {
                    Ok(()) => tracing::info!("shutdown: signal received"),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "shutdown: signal listener failed; falling back to ctrl_c()"
                        );
                        let _ = tokio::signal::ctrl_c().await;
                    }
                }
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::info!("shutdown: external token will control lifecycle");
        }
    }

    let mut builder = ModuleCtxBuilder::new(cancel.clone())
        .with_client_hub(hub)
        .with_config_provider(modules_cfg);
    if let Some(db) = &db {
        builder = builder.with_db(db.clone());
    }
    let base_ctx = builder.build();

    tracing::info!(modules = ?registry.names(), "Phase: init");
    registry.run_init_phase(&base_ctx).await?;

    tracing::info!("Phase: db");
    registry.run_db_phase(db.as_ref()).await?;

    tracing::info!("Phase: rest");
    registry.run_rest_phase(&base_ctx, axum::Router::new())?;

    tracing::info!("Phase: start");
    if let Err(e) = registry.run_start_phase(cancel.clone()).await {
        cancel.cancel();
        registry.run_stop_phase(cancel).await;
        return Err(e.into());
    }

    cancel.cancelled().await;

    tracing::info!("Phase: stop");
    registry.run_stop_phase(cancel).await;
    Ok(())
}
