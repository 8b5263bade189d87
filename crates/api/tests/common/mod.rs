#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use bonusdesk_core::ingestion::FirstTokenSplitter;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use bonusdesk_api::config::{LogFormat, ServerConfig};
use bonusdesk_api::router::build_app_router;
use bonusdesk_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and webhook
/// verification disabled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        calendly_signing_key: None,
        google_forms_token: None,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router, with the production middleware
/// stack, over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        name_splitter: Arc::new(FirstTokenSplitter),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, body.to_string().into_bytes(), &[]).await
}

/// POST raw bytes with `content-type: application/json` plus extra headers.
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn seed_client(pool: &PgPool, name: &str, surname: Option<&str>) -> i64 {
    sqlx::query_scalar("INSERT INTO clients (name, surname) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(surname)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_engagement(
    pool: &PgPool,
    client_id: i64,
    status: &str,
    profit: f64,
    completed_at: &str,
) {
    let app_id: i64 = sqlx::query_scalar(
        "INSERT INTO apps (name) VALUES ('app-' || gen_random_uuid()::text) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO client_apps (client_id, app_id, status, profit_us, completed_at) \
         VALUES ($1, $2, $3, $4, $5::timestamptz)",
    )
    .bind(client_id)
    .bind(app_id)
    .bind(status)
    .bind(profit)
    .bind(completed_at)
    .execute(pool)
    .await
    .unwrap();
}
