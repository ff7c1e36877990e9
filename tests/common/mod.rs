//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use payinsight::clock::SystemClock;
use payinsight::random::{FixedRandom, RandomSource};
use payinsight::store::{InMemoryTransactionStore, InMemoryUserStore};
use payinsight::{api, db, AppState, Config};

pub const ADMIN_EMAIL: &str = "admin@payinsight.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ANALYST_EMAIL: &str = "analyst@payinsight.com";
pub const ANALYST_PASSWORD: &str = "analyst123";

/// In-memory application with the default users seeded.
///
/// `FixedRandom(0.99)` never trips fault injection and settles as `Failed`.
pub async fn setup_app() -> (Router, AppState) {
    setup_app_with(Arc::new(FixedRandom(0.99))).await
}

pub async fn setup_app_with(random: Arc<dyn RandomSource>) -> (Router, AppState) {
    let config = Config::from_lookup(|_| None).expect("default config");
    let clock = Arc::new(SystemClock);
    let users = Arc::new(InMemoryUserStore::new());

    db::seed_default_users(users.as_ref(), clock.as_ref())
        .await
        .expect("Failed to seed users");

    let state = AppState::new(
        &config,
        Arc::new(InMemoryTransactionStore::new()),
        users,
        clock,
        random,
    );
    let app = api::build_router(state.clone(), &config.cors_allowed_origins);

    (app, state)
}

/// Send a request and decode the JSON response body (Null when empty)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Log in and return the bearer token
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    body["token"].as_str().expect("token in response").to_string()
}

/// Connect to `DATABASE_URL` and apply `migrations/`.
///
/// Only used by the `#[ignore]`d PostgreSQL tests:
/// `DATABASE_URL=... cargo test -- --ignored`
pub async fn setup_test_db() -> sqlx::PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
