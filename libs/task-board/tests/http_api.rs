//! HTTP remote and session against a mocked TaskFlow server.

use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;
use task_board::{
    BoardError, FileCache, HttpApi, LocalCache, MemoryCache, Priority, Session, TaskBoard,
    TaskUpdate, TasksRemote, TASKS_KEY, TOKEN_KEY, USER_KEY,
};
use url::Url;
use uuid::Uuid;

fn api_for(server: &MockServer) -> Arc<HttpApi> {
    Arc::new(HttpApi::new(Url::parse(&server.base_url()).unwrap()))
}

fn task_json(id: Uuid, title: &str, completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "owner_id": Uuid::new_v4(),
        "title": title,
        "completed": completed,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z",
    })
}

#[tokio::test]
async fn task_calls_carry_bearer_token() {
    let server = MockServer::start();
    let id = Uuid::new_v4();

    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/api/tasks")
            .query_param("page", "2")
            .query_param("limit", "10")
            .header("authorization", "Bearer tok")
            .header_exists("x-request-id");
        then.status(200).json_body(json!([task_json(id, "A", false)]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/tasks")
            .header("authorization", "Bearer tok")
            .json_body(json!({ "title": "B" }));
        then.status(201).json_body(task_json(id, "B", false));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path(format!("/api/tasks/{id}"))
            .json_body(json!({ "completed": true }));
        then.status(200).json_body(task_json(id, "B", true));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path(format!("/api/tasks/{id}"));
        then.status(200).json_body(json!({ "message": "Task deleted" }));
    });

    let api = api_for(&server);
    api.set_token(Some("tok".into()));

    let listed = api.list(2, 10).await.unwrap();
    assert_eq!(listed[0].title, "A");

    let created = api.create("B").await.unwrap();
    assert_eq!(created.id, id);

    let updated = api
        .update(
            id,
            &TaskUpdate {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.completed);

    api.delete(id).await.unwrap();

    list.assert();
    create.assert();
    update.assert();
    delete.assert();
}

#[tokio::test]
async fn problem_bodies_map_to_errors() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    server.mock(|when, then| {
        when.method(PUT).path(format!("/api/tasks/{id}"));
        then.status(404)
            .header("content-type", "application/problem+json")
            .json_body(json!({
                "type": "https://errors.taskflow.dev/TASKS_NOT_FOUND",
                "title": "Task not found",
                "status": 404,
                "detail": format!("Task not found: {id}"),
                "code": "TASKS_NOT_FOUND",
            }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/tasks");
        then.status(401).body("plain text");
    });

    let api = api_for(&server);
    let err = api.update(id, &TaskUpdate::default()).await.unwrap_err();
    match err {
        BoardError::NotFound(detail) => assert!(detail.contains(&id.to_string())),
        other => panic!("unexpected {other:?}"),
    }

    let err = api.list(1, 5).await.unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized(ref d) if d == "plain text"));
}

#[tokio::test]
async fn base_url_with_path_prefix_is_kept() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET).path("/prefix/api/tasks");
        then.status(200).json_body(json!([]));
    });

    let base = Url::parse(&format!("{}/prefix", server.base_url())).unwrap();
    let api = HttpApi::new(base);
    assert!(api.list(1, 5).await.unwrap().is_empty());
    m.assert();
}

#[tokio::test]
async fn login_stores_token_and_display_name() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(json!({ "email": "jane.doe@gmail.com", "password": "pw" }));
        then.status(200).json_body(json!({ "token": "jwt-123" }));
    });
    let tasks = server.mock(|when, then| {
        when.method(GET)
            .path("/api/tasks")
            .header("authorization", "Bearer jwt-123");
        then.status(200).json_body(json!([]));
    });

    let cache = Arc::new(MemoryCache::new());
    let api = api_for(&server);
    let session = Session::new(api.clone(), cache.clone());

    let user = session.login("jane.doe@gmail.com", "pw").await.unwrap();
    assert_eq!(user.name, "jane.doe");
    assert_eq!(cache.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt-123"));
    assert_eq!(
        cache.get(USER_KEY).unwrap().as_deref(),
        Some(r#"{"name":"jane.doe"}"#)
    );

    let mut board = TaskBoard::new(session.api(), cache.clone());
    board.load().await.unwrap();
    tasks.assert();

    cache.set(TASKS_KEY, "[]").unwrap();
    session.logout().unwrap();
    assert!(!api.has_token());
    for key in [TOKEN_KEY, USER_KEY, TASKS_KEY] {
        assert_eq!(cache.get(key).unwrap(), None, "{key} not cleared");
    }
}

#[tokio::test]
async fn failed_login_stores_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401).json_body(json!({
            "type": "https://errors.taskflow.dev/AUTH_UNAUTHORIZED",
            "title": "Unauthorized",
            "status": 401,
            "detail": "Invalid email or password",
        }));
    });

    let cache = Arc::new(MemoryCache::new());
    let session = Session::new(api_for(&server), cache.clone());
    let err = session.login("a@gmail.com", "bad").await.unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized(ref d) if d == "Invalid email or password"));
    assert_eq!(cache.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn register_conflict_and_session_restore_from_files() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/register");
        then.status(409).json_body(json!({
            "type": "https://errors.taskflow.dev/AUTH_EMAIL_CONFLICT",
            "title": "Email already exists",
            "status": 409,
            "detail": "User with email 'taken@gmail.com' already exists",
        }));
    });

    let tmp = tempfile::tempdir().unwrap();
    let cache = Arc::new(FileCache::new(tmp.path()));
    let session = Session::new(api_for(&server), cache.clone());

    let err = session
        .register("Taken", "taken@gmail.com", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::Conflict(_)));

    assert_eq!(session.restore().unwrap(), None);

    cache.set(TOKEN_KEY, "persisted").unwrap();
    cache.set(USER_KEY, r#"{"name":"taken"}"#).unwrap();
    let reopened = Session::new(api_for(&server), Arc::new(FileCache::new(tmp.path())));
    let user = reopened.restore().unwrap().unwrap();
    assert_eq!(user.name, "taken");
    assert!(reopened.api().has_token());
}

#[tokio::test]
async fn board_add_over_http() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    server.mock(|when, then| {
        when.method(POST).path("/api/tasks");
        then.status(201).json_body(task_json(id, "Write docs", false));
    });

    let cache = Arc::new(MemoryCache::new());
    let mut board = TaskBoard::new(api_for(&server), cache.clone());
    let task = board.add("Write docs", Priority::Low).await.unwrap();
    assert_eq!(task.id, id);
    assert_eq!(task.priority, Priority::Low);

    let cached = cache.get(TASKS_KEY).unwrap().unwrap();
    assert!(cached.contains(&id.to_string()));
    assert!(cached.contains("\"priority\":\"Low\""));
}

#[tracing_test::traced_test]
#[tokio::test]
async fn truncated_error_body_is_logged_and_tolerated() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises 100 body bytes, sends 5, then hangs up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort")
            .await
            .unwrap();
    });

    let api = HttpApi::new(Url::parse(&format!("http://{addr}")).unwrap());
    let err = api.list(1, 5).await.unwrap_err();

    assert!(matches!(err, BoardError::Server { status: 500, ref detail } if detail.is_empty()));
    assert!(logs_contain("Failed to read error body"));
}
