//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A router backed by a lazy pool, for paths that never reach the database
//! - Test database setup with a seeded user and session
//! - Request helpers returning status, headers and the decoded envelope

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use tasktrack_api::app::{build_router, AppState};
use tasktrack_api::config::Config;
use tasktrack_shared::auth::token::generate_access_token;
use tasktrack_shared::db::migrations::run_migrations;
use tasktrack_shared::db::pool::{create_lazy_pool, DatabaseConfig, DatabasePools};
use tasktrack_shared::models::session::Session;
use tasktrack_shared::models::user::{CreateUser, User};
use tower::Service as _;

static UNIQUE: AtomicU64 = AtomicU64::new(0);

/// Returns a name no other test in this process will use
pub fn unique_name(prefix: &str) -> String {
    let micros = Utc::now().timestamp_micros();
    format!(
        "{}-{}-{}-{}",
        prefix,
        std::process::id(),
        micros,
        UNIQUE.fetch_add(1, Ordering::Relaxed)
    )
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn messages(&self) -> Vec<String> {
        self.body["messages"]
            .as_array()
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Sends one request through the router
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }

    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    send_request(app, builder.body(body).unwrap()).await
}

/// Sends a prepared request through the router
pub async fn send_request(app: &axum::Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().call(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Router whose pools never connect
///
/// Must be built inside a Tokio runtime.
pub fn offline_app() -> axum::Router {
    let mut config = Config::default();
    config.database.write_url = "postgresql://localhost:5432/tasktrack_offline".to_string();
    config.database.read_url = config.database.write_url.clone();

    let pool = create_lazy_pool(&DatabaseConfig {
        min_connections: 0,
        ..DatabaseConfig::new(config.database.write_url.clone())
    })
    .expect("lazy pool");

    build_router(AppState::new(DatabasePools::single(pool), config))
}

/// Test context containing a migrated database and one logged-in user
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub access_token: String,
    users: Vec<i64>,
}

impl TestContext {
    /// Connects to `DATABASE_URL`, migrates, and seeds a user with a session
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_page_size(Config::default().tasks.page_size).await
    }

    pub async fn with_page_size(page_size: u32) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")?;

        let mut config = Config::default();
        config.database.write_url = url.clone();
        config.database.read_url = url.clone();
        config.tasks.page_size = page_size;

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        let app = build_router(AppState::new(DatabasePools::single(db.clone()), config.clone()));

        let (user, access_token) = seed_user(&db).await?;

        Ok(TestContext {
            db,
            app,
            config,
            users: vec![user.id],
            user,
            access_token,
        })
    }

    /// Adds another user with a live session
    pub async fn add_user(&mut self) -> anyhow::Result<(User, String)> {
        let (user, token) = seed_user(&self.db).await?;
        self.users.push(user.id);
        Ok((user, token))
    }

    /// Records a user created through the API so cleanup removes it
    pub fn track_user(&mut self, user_id: i64) {
        self.users.push(user_id);
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        send(&self.app, method, uri, Some(&self.access_token), body).await
    }

    /// Deletes every user this context created; tasks and sessions cascade
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&self.users)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

async fn seed_user(db: &PgPool) -> anyhow::Result<(User, String)> {
    let user = User::create(
        db,
        CreateUser {
            full_name: "Test User".to_string(),
            username: unique_name("user"),
            password_hash: "test_hash".to_string(), // Not used in tests
        },
    )
    .await?;

    let (token, digest) = generate_access_token();
    Session::create(db, user.id, &digest, Utc::now() + Duration::minutes(20)).await?;

    Ok((user, token))
}
