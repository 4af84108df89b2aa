//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the production router (same middleware stack as `main.rs`) around
//! a test database pool and drives it in-process with `tower::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use aiforge_api::auth::jwt::{generate_access_token, JwtConfig};
use aiforge_api::config::ServerConfig;
use aiforge_api::router::build_app_router;
use aiforge_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Mint an access token for an existing user id, signed with the test secret.
pub fn token_for(user_id: i64) -> String {
    generate_access_token(user_id, "user", &test_config().jwt).expect("token generation")
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request construction");

    app.clone().oneshot(request).await.expect("request")
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST with a bearer token and no body (activate/cancel endpoints).
pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Insert a user directly (no credential) and mint a token for them.
pub async fn seed_user(pool: &PgPool, name: &str) -> (i64, String) {
    let user = aiforge_db::repositories::UserRepo::create(
        pool,
        &aiforge_db::models::user::CreateUser {
            name: name.to_string(),
            email: format!("{name}@test.com"),
            password_hash: None,
            avatar_url: None,
        },
    )
    .await
    .expect("user creation");
    let token = token_for(user.id);
    (user.id, token)
}

/// Request body for a valid auction creation.
pub fn auction_body(category_id: i64, starting_price: i64) -> serde_json::Value {
    serde_json::json!({
        "title": "AI Resume Builder SaaS",
        "description": "A complete SaaS application that uses an LLM to generate professional resumes. Includes billing and PDF export.",
        "category_id": category_id,
        "starting_price": starting_price,
        "duration": 7,
        "tags": ["saas", "ai"],
        "images": [
            { "url": "https://cdn.test/shot.png", "storage_key": "shot.png", "is_primary": true }
        ]
    })
}

/// First seeded category id.
pub async fn first_category(pool: &PgPool) -> i64 {
    aiforge_db::repositories::CategoryRepo::list(pool)
        .await
        .expect("categories")[0]
        .id
}
