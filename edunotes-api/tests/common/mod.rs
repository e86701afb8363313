//! Common test utilities for API integration tests
//!
//! - [`TestContext::new`]: router backed by the real database at
//!   `DATABASE_URL`; returns `None` (and the test skips) when it is unset
//! - [`offline_app`]: router over a lazily-connected pool that never reaches
//!   a database, for tests that are rejected before any query runs
//! - Request helpers returning `(StatusCode, serde_json::Value)`

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use edunotes_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, OperatorConfig, PolicyConfig},
};
use edunotes_shared::{
    db::migrations::run_migrations,
    auth::{
        jwt::{create_token, Claims},
        operator::hash_operator_key,
    },
    models::user::{CreateUser, User},
};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const OPERATOR_KEY: &str = "test-operator-key";

/// Configuration shared by every test router
pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiration_minutes: 30,
        },
        policy: PolicyConfig::default(),
        operator: OperatorConfig {
            key_digest: Some(hash_operator_key(OPERATOR_KEY)),
        },
    }
}

/// Router whose pool points at a closed port
pub fn offline_app() -> Router {
    let url = "postgres://edunotes@127.0.0.1:1/unused";
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(500))
        .connect_lazy(url)
        .expect("lazy pool");

    build_router(AppState::new(pool, test_config(url)))
}

/// Bearer token for an arbitrary identity, signed with the test secret
pub fn token_for(user_id: i64, username: &str, email: &str) -> String {
    let claims = Claims::new(user_id, username, email, Duration::minutes(5));
    create_token(&claims, JWT_SECRET).unwrap()
}

/// A user created directly in the database, with a valid token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.user_id
    }
}

/// Test context backed by a real database
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Connects, migrates and builds the router
    ///
    /// Returns `None` when `DATABASE_URL` is not set.
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        };

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");

        run_migrations(&db).await.expect("run migrations");

        let app = build_router(AppState::new(db.clone(), test_config(&url)));

        Some(TestContext { db, app })
    }

    /// Creates a user with a unique name and issues a token for it
    pub async fn user(&self, prefix: &str) -> TestUser {
        let name = unique(prefix);
        let user = User::create(
            &self.db,
            CreateUser {
                username: name.clone(),
                email: format!("{}@example.com", name),
                first_name: "Test".to_string(),
                last_name: prefix.to_string(),
                password_hash: "not-a-real-hash".to_string(),
            },
        )
        .await
        .expect("create user");

        let token = token_for(user.user_id, &user.username, &user.email);
        TestUser { user, token }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send(&self.app, "GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, "POST", uri, token, body).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, "PUT", uri, token, body).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send(&self.app, "DELETE", uri, token, None).await
    }

    /// Creates an organization owned by `owner` over HTTP and returns its ID
    pub async fn organization(&self, owner: &TestUser) -> i64 {
        let (status, body) = self
            .post(
                "/organizations",
                Some(&owner.token),
                Some(serde_json::json!({ "organization_name": unique("org") })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        body["data"]["organization_id"].as_i64().unwrap()
    }
}

/// Sends one request through `app` and decodes the JSON body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}
