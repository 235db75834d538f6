//! The service logs inside its `auth.service.*` spans and never logs secrets.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing_test::traced_test;

use auth::config::DEFAULT_EMAIL_PATTERN;
use auth::contract::model::{Credentials, NewUser};
use auth::domain::{
    model::StoredUser,
    repo::UsersRepository,
    service::{Service, ServiceConfig},
    token::TokenCodec,
};

#[derive(Default)]
struct MemoryUsers(Mutex<Vec<StoredUser>>);

#[async_trait::async_trait]
impl UsersRepository for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<StoredUser>> {
        Ok(self.0.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self.0.lock().iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: StoredUser) -> anyhow::Result<bool> {
        let mut users = self.0.lock();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        users.push(user);
        Ok(true)
    }
}

struct FailingUsers;

#[async_trait::async_trait]
impl UsersRepository for FailingUsers {
    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<StoredUser>> {
        anyhow::bail!("connection reset")
    }

    async fn email_exists(&self, _email: &str) -> anyhow::Result<bool> {
        anyhow::bail!("connection reset")
    }

    async fn insert(&self, _user: StoredUser) -> anyhow::Result<bool> {
        anyhow::bail!("connection reset")
    }
}

/// Passes the existence check, then loses the insert to another registration.
struct RacedUsers;

#[async_trait::async_trait]
impl UsersRepository for RacedUsers {
    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<StoredUser>> {
        Ok(None)
    }

    async fn email_exists(&self, _email: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn insert(&self, _user: StoredUser) -> anyhow::Result<bool> {
        Ok(false)
    }
}

fn service(repo: Arc<dyn UsersRepository>) -> Service {
    Service::new(
        repo,
        TokenCodec::new("k", Duration::from_secs(60)),
        ServiceConfig::new(DEFAULT_EMAIL_PATTERN).unwrap(),
    )
}

fn carol() -> NewUser {
    NewUser {
        name: "Carol".into(),
        email: "carol@gmail.com".into(),
        password: "hunter2-secret".into(),
    }
}

#[traced_test]
#[tokio::test]
async fn register_logs_user_id_not_password() {
    let svc = service(Arc::new(MemoryUsers::default()));
    let user = svc.register(carol()).await.unwrap();

    assert!(logs_contain("auth.service.register"));
    assert!(logs_contain(&user.id.to_string()));
    assert!(!logs_contain("hunter2-secret"));
}

#[traced_test]
#[tokio::test]
async fn wrong_password_is_logged_as_warning() {
    let svc = service(Arc::new(MemoryUsers::default()));
    svc.register(carol()).await.unwrap();

    let res = svc
        .login(Credentials {
            email: "carol@gmail.com".into(),
            password: "guess".into(),
        })
        .await;

    assert!(res.is_err());
    assert!(logs_contain("Login with wrong password"));
    assert!(!logs_contain("guess"));
}

#[traced_test]
#[tokio::test]
async fn repository_failures_become_database_errors() {
    let svc = service(Arc::new(FailingUsers));
    let err = svc.register(carol()).await.unwrap_err();
    assert!(matches!(
        err,
        auth::domain::error::DomainError::Database { .. }
    ));
}

#[traced_test]
#[tokio::test]
async fn email_taken_during_insert_is_a_conflict() {
    let svc = service(Arc::new(RacedUsers));
    let err = svc.register(carol()).await.unwrap_err();
    assert!(matches!(
        err,
        auth::domain::error::DomainError::EmailAlreadyExists { .. }
    ));
    assert!(logs_contain("Email taken during insert"));
}
