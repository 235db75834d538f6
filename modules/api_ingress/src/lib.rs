//! HTTP front door: owns the router, the middleware stack and the listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::{middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// REST host module. `rest_prepare` mounts `/health`, `rest_finalize` wraps
/// every route in the middleware stack, `start` binds and serves.
pub struct ApiIngress {
    bind_addr: SocketAddr,
    request_timeout: Duration,
    config: ArcSwap<ApiIngressConfig>,
    final_router: Mutex<Option<Router>>,
    local_addr: Mutex<Option<SocketAddr>>,
    server: Mutex<Option<JoinHandle<anyhow::Result<()>>>>,
}

impl ApiIngress {
    pub fn new(bind_addr: SocketAddr, request_timeout: Duration) -> Self {
        Self {
            bind_addr,
            request_timeout,
            config: ArcSwap::from_pointee(ApiIngressConfig::default()),
            final_router: Mutex::new(None),
            local_addr: Mutex::new(None),
            server: Mutex::new(None),
        }
    }

    pub fn config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Address actually bound by `start`; differs from the configured one
    /// when port 0 was requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Wraps `router` in the ingress middleware stack.
    ///
    /// Outermost first: set request id → propagate it to the response →
    /// trace span → request id into extensions → timeout → CORS → body limit.
    pub fn apply_middleware(&self, router: Router) -> Router {
        let cfg = self.config();
        let x_request_id = request_id::header();

        let mut router = router.layer(RequestBodyLimitLayer::new(cfg.max_body_bytes));
        if cfg.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|req: &Request<Body>| {
                        tracing::info_span!(
                            "http_request",
                            method = %req.method(),
                            path = %req.uri().path(),
                            request_id = %request_id::request_id_of(req),
                        )
                    })
                    .on_response(
                        DefaultOnResponse::new()
                            .level(tracing::Level::INFO)
                            .latency_unit(LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    async fn serve(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let router = {
            let stored = self.final_router.lock().take();
            match stored {
                Some(r) => r,
                None => {
                    tracing::debug!("No router from REST phase, serving health only");
                    self.apply_middleware(Router::new().route("/health", get(web::health_check)))
                }
            }
        };

        let listener = tokio::net::TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", self.bind_addr))?;
        let addr = listener.local_addr()?;
        *self.local_addr.lock() = Some(addr);
        tracing::info!(%addr, "HTTP server bound");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel.cancelled().await;
                    tracing::info!("HTTP server shutting down gracefully");
                })
                .await
                .map_err(anyhow::Error::from)
        });
        *self.server.lock() = Some(handle);
        Ok(())
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> anyhow::Result<()> {
        let cfg: ApiIngressConfig = ctx.module_config()?;
        tracing::debug!(
            cors_enabled = cfg.cors_enabled,
            max_body_bytes = cfg.max_body_bytes,
            "api_ingress configured"
        );
        self.config.store(Arc::new(cfg));
        Ok(())
    }
}

impl modkit::RestHostModule for ApiIngress {
    fn rest_prepare(&self, _ctx: &modkit::ModuleCtx, router: Router) -> anyhow::Result<Router> {
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(&self, _ctx: &modkit::ModuleCtx, router: Router) -> anyhow::Result<Router> {
        let router = self.apply_middleware(router);
        *self.final_router.lock() = Some(router.clone());
        tracing::debug!("REST host finalized router");
        Ok(router)
    }
}

#[async_trait]
impl modkit::StatefulModule for ApiIngress {
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        self.serve(cancel).await
    }

    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        cancel.cancel();
        let handle = self.server.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(joined) => joined?,
            Err(_) => anyhow::bail!("HTTP server did not stop within {STOP_TIMEOUT:?}"),
        }
    }
}
