use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    routing::post,
    Router,
};
use modkit::{ConfigProvider, Module, ModuleCtx, ModuleCtxBuilder, RestHostModule, StatefulModule};
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

use api_ingress::ApiIngress;

struct Sections(HashMap<String, serde_json::Value>);

impl ConfigProvider for Sections {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get(module_name)
    }
}

fn ctx(section: Option<serde_json::Value>, cancel: CancellationToken) -> ModuleCtx {
    let mut map = HashMap::new();
    if let Some(v) = section {
        map.insert("api_ingress".to_string(), v);
    }
    ModuleCtxBuilder::new(cancel)
        .with_config_provider(Arc::new(Sections(map)))
        .build()
        .for_module("api_ingress")
}

async fn configured(section: Option<serde_json::Value>) -> (ApiIngress, ModuleCtx) {
    let ingress = ApiIngress::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5));
    let ctx = ctx(section, CancellationToken::new());
    ingress.init(&ctx).await.unwrap();
    (ingress, ctx)
}

fn host_router(ingress: &ApiIngress, ctx: &ModuleCtx, routes: Router) -> Router {
    let router = ingress.rest_prepare(ctx, Router::new()).unwrap();
    ingress.rest_finalize(ctx, router.merge(routes)).unwrap()
}

#[tokio::test]
async fn defaults_enable_cors_and_one_mebibyte_limit() {
    let (ingress, _) = configured(None).await;
    let cfg = ingress.config();
    assert!(cfg.cors_enabled);
    assert_eq!(cfg.max_body_bytes, 1024 * 1024);
}

#[tokio::test]
async fn unknown_config_keys_fail_init() {
    let ingress = ApiIngress::new("127.0.0.1:0".parse().unwrap(), Duration::from_secs(5));
    let ctx = ctx(
        Some(serde_json::json!({ "cors": true })),
        CancellationToken::new(),
    );
    assert!(ingress.init(&ctx).await.is_err());
}

#[tokio::test]
async fn health_is_mounted_by_rest_prepare() {
    let (ingress, ctx) = configured(None).await;
    let app = host_router(&ingress, &ctx, Router::new());

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (ingress, ctx) = configured(Some(serde_json::json!({ "max_body_bytes": 16 }))).await;
    let routes = Router::new().route("/upload", post(|body: Bytes| async move { body.len().to_string() }));
    let app = host_router(&ingress, &ctx, routes);

    let payload = vec![b'x'; 64];
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/upload")
                .header(header::CONTENT_LENGTH, payload.len())
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let resp = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/upload")
                .body(Body::from("small"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_headers_follow_config() {
    let preflight = || {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let (ingress, ctx) = configured(None).await;
    let resp = host_router(&ingress, &ctx, Router::new())
        .oneshot(preflight())
        .await
        .unwrap();
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let (ingress, ctx) = configured(Some(serde_json::json!({ "cors_enabled": false }))).await;
    let resp = host_router(&ingress, &ctx, Router::new())
        .oneshot(preflight())
        .await
        .unwrap();
    assert!(!resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn serves_until_cancelled() {
    let (ingress, ctx) = configured(None).await;
    host_router(&ingress, &ctx, Router::new());

    let cancel = CancellationToken::new();
    ingress.start(cancel.clone()).await.unwrap();
    let addr = ingress.local_addr().expect("bound address");
    assert_ne!(addr.port(), 0);

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers().contains_key("x-request-id"));
    drop(resp);

    ingress.stop(cancel.clone()).await.unwrap();
    assert!(cancel.is_cancelled());
    assert!(reqwest::get(format!("http://{addr}/health")).await.is_err());
}
