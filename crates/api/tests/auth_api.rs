//! HTTP-level integration tests for registration and login.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json};
use sqlx::PgPool;

/// Successful registration returns 201 with public fields only.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_success(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({
        "name": "Demo User",
        "email": "demo@aiforge.com",
        "password": "a-strong-password",
    });
    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["data"]["id"].is_number());
    assert_eq!(json["data"]["name"], "Demo User");
    assert_eq!(json["data"]["email"], "demo@aiforge.com");
    assert!(
        json["data"].get("password_hash").is_none(),
        "hash must never be serialized"
    );

    // The stored credential is an Argon2id PHC string, not the plaintext.
    let (hash,): (Option<String>,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = 'demo@aiforge.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
    let hash = hash.expect("credential stored");
    assert!(hash.starts_with("$argon2id$"));
}

/// A duplicate email is a 409 and creates no second row.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_email_conflict(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({
        "name": "Demo User",
        "email": "demo@aiforge.com",
        "password": "a-strong-password",
    });
    let response = post_json(&app, "/api/v1/auth/register", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(&app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

/// Malformed inputs are 400 validation errors.
#[sqlx::test(migrations = "../../migrations")]
async fn test_register_validation(pool: PgPool) {
    let app = common::build_test_app(pool);

    let cases = [
        serde_json::json!({ "name": "X", "email": "x@test.com", "password": "a-strong-password" }),
        serde_json::json!({ "name": "Demo", "email": "not-an-email", "password": "a-strong-password" }),
        serde_json::json!({ "name": "Demo", "email": "demo@test.com", "password": "short" }),
    ];
    for body in cases {
        let response = post_json(&app, "/api/v1/auth/register", body.clone()).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "body {body} should fail validation"
        );
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}

/// Registered users can log in and use the returned token.
#[sqlx::test(migrations = "../../migrations")]
async fn test_login_and_use_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Demo User",
        "email": "demo@aiforge.com",
        "password": "a-strong-password",
    });
    post_json(&app, "/api/v1/auth/register", body).await;

    let body = serde_json::json!({ "email": "demo@aiforge.com", "password": "a-strong-password" });
    let response = post_json(&app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token = json["access_token"].as_str().expect("token").to_string();
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["email"], "demo@aiforge.com");

    let response = get_auth(&app, "/api/v1/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Wrong password and unknown email are the same uniform 401.
#[sqlx::test(migrations = "../../migrations")]
async fn test_login_rejections(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Demo User",
        "email": "demo@aiforge.com",
        "password": "a-strong-password",
    });
    post_json(&app, "/api/v1/auth/register", body).await;

    let wrong_password =
        serde_json::json!({ "email": "demo@aiforge.com", "password": "incorrect" });
    let response = post_json(&app, "/api/v1/auth/login", wrong_password).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let first = body_json(response).await;

    let unknown_email =
        serde_json::json!({ "email": "ghost@aiforge.com", "password": "a-strong-password" });
    let response = post_json(&app, "/api/v1/auth/login", unknown_email).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let second = body_json(response).await;

    assert_eq!(first["error"], second["error"]);
}

/// Protected routes refuse missing or garbage tokens.
#[sqlx::test(migrations = "../../migrations")]
async fn test_protected_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(&app, "/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(&app, "/api/v1/dashboard", "not.a.token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
