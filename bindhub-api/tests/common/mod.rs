/// Common test utilities for storage-backed integration tests
///
/// These tests need a reachable PostgreSQL instance, named by
/// `TEST_DATABASE_URL`. When the variable is unset [`TestContext::new`]
/// returns `None` and the test skips itself, so the storage-free suite stays
/// runnable everywhere.
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::Service as _;

use bindhub_api::app::{build_router, AppState};
use bindhub_api::config::{ApiConfig, BootstrapConfig, Config, DatabaseConfig, JwtConfig};
use bindhub_shared::auth::jwt::{self, Claims};
use bindhub_shared::auth::password::hash_password;
use bindhub_shared::db::migrations::run_migrations;
use bindhub_shared::models::account::{Account, CreateAccount};

pub const TEST_SECRET: &str = "storage-test-secret-0123456789abcdef";

/// Known plaintext for every account the context creates
pub const PASSWORD: &str = "Passw0rd";

pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

impl TestContext {
    /// Connects, migrates, and builds the router; `None` when no test
    /// database is configured.
    pub async fn new() -> anyhow::Result<Option<Self>> {
        let url = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("TEST_DATABASE_URL not set; skipping storage-backed test");
                return Ok(None);
            }
        };

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
            },
            bootstrap: BootstrapConfig {
                admin_email: "admin@example.com".to_string(),
                admin_password: "ChangeMe123".to_string(),
            },
        };

        let app = build_router(AppState::new(db.clone(), config));

        Ok(Some(TestContext { db, app }))
    }

    /// Creates a MEMBER account with the shared [`PASSWORD`] and a unique
    /// email, so parallel tests never collide on the uniqueness constraint.
    pub async fn create_account(&self, tag: &str) -> anyhow::Result<Account> {
        let account = Account::create(
            &self.db,
            CreateAccount {
                email: unique_email(tag),
                password_hash: hash_password(PASSWORD)?,
                manager_name: None,
                tel: None,
                ext: None,
                channel_token: None,
                channel_secret: None,
                bind_type: None,
                bind_word: None,
                status: true,
                created_by: Some("test".to_string()),
            },
        )
        .await?;

        Ok(account)
    }

    pub fn auth_header(&self, account: &Account) -> String {
        let email = account.email.clone().unwrap_or_default();
        let claims = Claims::new(account.id, email, account.role);
        let token = jwt::issue_token(&claims, TEST_SECRET).unwrap();
        format!("Bearer {}", token)
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    /// Deletes the accounts this test created; owned users cascade.
    pub async fn cleanup(&self, accounts: &[&Account]) -> anyhow::Result<()> {
        for account in accounts {
            Account::delete(&self.db, account.id).await?;
        }
        Ok(())
    }
}

pub fn unique_email(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}@example.com", tag, nanos)
}

pub fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let addr: SocketAddr = "203.0.113.9:40000".parse().unwrap();
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(addr));

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}
