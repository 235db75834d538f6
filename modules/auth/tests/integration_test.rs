//! Integration tests for the auth module.
//!
//! Each test runs on a fresh in-memory SQLite database with migrations
//! applied; the REST layer is exercised through `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Extension, Router,
};
use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use auth::{
    api::rest::routes,
    config::DEFAULT_EMAIL_PATTERN,
    contract::{client::AuthApi, error::AuthError, model::{Credentials, NewUser}},
    domain::{
        error::DomainError,
        model::StoredUser,
        repo::UsersRepository,
        service::{Service, ServiceConfig},
        token::TokenCodec,
    },
    gateways::local::AuthLocalClient,
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmUsersRepository},
    AuthUser,
};
use modkit::{DbModule, Module, ModuleCtxBuilder, RestfulModule};

const SECRET: &str = "test-secret";
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

async fn create_test_service() -> Arc<Service> {
    let repo = SeaOrmUsersRepository::new(create_test_db().await);
    Arc::new(Service::new(
        Arc::new(repo),
        TokenCodec::new(SECRET, DAY),
        ServiceConfig::new(DEFAULT_EMAIL_PATTERN).unwrap(),
    ))
}

fn alice() -> NewUser {
    NewUser {
        name: "Alice".to_string(),
        email: "alice@gmail.com".to_string(),
        password: "wonderland".to_string(),
    }
}

fn creds(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn test_router(service: Arc<Service>) -> Router {
    let api: Arc<dyn AuthApi> = Arc::new(AuthLocalClient::new(service.clone()));
    let protected = Router::new()
        .route(
            "/me",
            get(|AuthUser(p): AuthUser| async move { p.name }),
        )
        .layer(Extension(api));
    routes::register_routes(Router::new(), service)
        .unwrap()
        .merge(protected)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_me(app: &Router, authorization: Option<&str>) -> (StatusCode, Value, String) {
    let mut req = Request::builder().uri("/me");
    if let Some(a) = authorization {
        req = req.header(header::AUTHORIZATION, a);
    }
    let resp = app
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let ct = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, body, ct)
}

#[tokio::test]
async fn register_then_login_then_authenticate() {
    let service = create_test_service().await;

    let user = service.register(alice()).await.unwrap();
    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "alice@gmail.com");

    let token = service
        .login(creds("alice@gmail.com", "wonderland"))
        .await
        .unwrap();
    assert!(token.expires_at > Utc::now());

    let principal = service.authenticate(&token.token).unwrap();
    assert_eq!(principal.user_id, user.id);
    assert_eq!(principal.name, "Alice");
}

#[tokio::test]
async fn register_validates_input() {
    let service = create_test_service().await;

    let mut u = alice();
    u.email = "alice@yahoo.com".into();
    assert!(matches!(
        service.register(u).await,
        Err(DomainError::InvalidEmail { .. })
    ));

    let mut u = alice();
    u.name = "   ".into();
    assert!(matches!(service.register(u).await, Err(DomainError::EmptyName)));

    let mut u = alice();
    u.password = String::new();
    assert!(matches!(
        service.register(u).await,
        Err(DomainError::EmptyPassword)
    ));
}

#[tokio::test]
async fn duplicate_email_conflicts_case_insensitively() {
    let service = create_test_service().await;
    service.register(alice()).await.unwrap();

    let mut again = alice();
    again.email = "ALICE@gmail.com".into();
    assert!(matches!(
        service.register(again).await,
        Err(DomainError::EmailAlreadyExists { .. })
    ));

    // Login is case-insensitive too.
    assert!(service
        .login(creds("Alice@Gmail.com", "wonderland"))
        .await
        .is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_duplicate_registration_conflicts() {
    let service = create_test_service().await;

    let (a, b) = tokio::join!(service.register(alice()), service.register(alice()));
    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(DomainError::EmailAlreadyExists { .. }))));
}

#[tokio::test]
async fn repository_reports_taken_email_on_insert() {
    let repo = SeaOrmUsersRepository::new(create_test_db().await);
    let user = |id| StoredUser {
        id,
        name: "Alice".into(),
        email: "alice@gmail.com".into(),
        password_hash: "phc".into(),
        created_at: Utc::now(),
    };

    assert!(repo.insert(user(uuid::Uuid::new_v4())).await.unwrap());
    assert!(!repo.insert(user(uuid::Uuid::new_v4())).await.unwrap());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_unauthorized() {
    let client = AuthLocalClient::new(create_test_service().await);
    client.register(alice()).await.unwrap();

    let err = client
        .login(creds("alice@gmail.com", "nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized { .. }));

    let err = client
        .login(creds("bob@gmail.com", "wonderland"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized { .. }));
}

#[tokio::test]
async fn tokens_from_other_keys_or_expired_are_rejected() {
    let service = create_test_service().await;
    let user = service.register(alice()).await.unwrap();

    let (foreign, _) = TokenCodec::new("other-secret", DAY)
        .issue(user.id, &user.name, Utc::now())
        .unwrap();
    assert!(matches!(
        service.authenticate(&foreign),
        Err(DomainError::InvalidToken { .. })
    ));

    let (expired, _) = TokenCodec::new(SECRET, DAY)
        .issue(user.id, &user.name, Utc::now() - chrono::Duration::hours(25))
        .unwrap();
    assert!(matches!(
        service.authenticate(&expired),
        Err(DomainError::InvalidToken { .. })
    ));
}

#[tokio::test]
async fn rest_register_and_login() {
    let app = test_router(create_test_service().await);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({ "name": "Alice", "email": "alice@gmail.com", "password": "wonderland" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "alice@gmail.com");
    assert!(body["id"].is_string());
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({ "name": "Alice", "email": "alice@gmail.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "AUTH_EMAIL_CONFLICT");
    assert_eq!(body["instance"], "/api/auth/register");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": "alice@gmail.com", "password": "wonderland" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": "alice@gmail.com", "password": "bad" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn rest_rejects_non_gmail_registration() {
    let app = test_router(create_test_service().await);
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(json!({ "name": "Bob", "email": "bob@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "AUTH_INVALID_EMAIL");
}

#[tokio::test]
async fn extractor_guards_routes() {
    let service = create_test_service().await;
    service.register(alice()).await.unwrap();
    let token = service
        .login(creds("alice@gmail.com", "wonderland"))
        .await
        .unwrap()
        .token;
    let app = test_router(service);

    let (status, body, _) = get_me(&app, Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Alice".into()));

    for bad in [None, Some("Bearer"), Some("Basic abc"), Some("Bearer not.a.jwt")] {
        let (status, body, ct) = get_me(&app, bad).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {bad:?}");
        assert_eq!(ct, modkit::APPLICATION_PROBLEM_JSON);
        assert_eq!(body["code"], "AUTH_UNAUTHORIZED");
    }
}

#[tokio::test]
async fn module_publishes_client_and_routes() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .with_db(db.clone())
        .build()
        .for_module("auth");

    let module = auth::Auth::default();
    module.init(&ctx).await.unwrap();
    module.migrate(&db).await.unwrap();
    // Migrations are idempotent.
    module.migrate(&db).await.unwrap();

    let api = ctx.client_hub().get::<dyn AuthApi>().unwrap();
    api.register(alice()).await.unwrap();

    let app = module.register_rest(&ctx, Router::new()).unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": "alice@gmail.com", "password": "wonderland" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn module_init_requires_database() {
    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .build()
        .for_module("auth");
    assert!(auth::Auth::default().init(&ctx).await.is_err());
}
