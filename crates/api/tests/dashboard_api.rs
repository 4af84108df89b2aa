//! HTTP-level integration tests for the authenticated dashboard.

mod common;

use axum::http::StatusCode;
use common::{
    auction_body, body_json, first_category, get, get_auth, post_auth, post_json_auth, seed_user,
};
use sqlx::PgPool;

async fn create_active_auction(
    app: &axum::Router,
    pool: &PgPool,
    token: &str,
    starting_price: i64,
) -> i64 {
    let category_id = first_category(pool).await;
    let response = post_json_auth(
        app,
        "/api/v1/auctions",
        token,
        auction_body(category_id, starting_price),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().expect("id");

    let response = post_auth(app, &format!("/api/v1/auctions/{id}/activate"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    id
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_dashboard_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/v1/dashboard").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The dashboard splits into what the user sells and what they bid on, and
/// carries their profile without the password hash.
#[sqlx::test(migrations = "../../migrations")]
async fn test_dashboard_aggregation(pool: PgPool) {
    let (_seller_id, seller_token) = seed_user(&pool, "seller").await;
    let (_bidder_id, bidder_token) = seed_user(&pool, "bidder").await;
    let app = common::build_test_app(pool.clone());

    let own_id = create_active_auction(&app, &pool, &bidder_token, 1000).await;
    let other_id = create_active_auction(&app, &pool, &seller_token, 2000).await;

    // Two bids on the same auction; only the latest should show.
    for amount in [3000, 4000] {
        let response = post_json_auth(
            &app,
            &format!("/api/v1/auctions/{other_id}/bids"),
            &bidder_token,
            serde_json::json!({ "amount": amount }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(&app, "/api/v1/dashboard", &bidder_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let selling = json["data"]["selling"].as_array().unwrap();
    assert_eq!(selling.len(), 1);
    assert_eq!(selling[0]["id"].as_i64().unwrap(), own_id);

    let bidding = json["data"]["bidding"].as_array().unwrap();
    assert_eq!(bidding.len(), 1);
    assert_eq!(bidding[0]["auction_id"].as_i64().unwrap(), other_id);
    assert_eq!(bidding[0]["my_bid_amount"], 4000);
    assert_eq!(bidding[0]["current_price"], 4000);
    assert_eq!(bidding[0]["seller_name"], "seller");

    assert_eq!(json["data"]["user"]["name"], "bidder");
    assert!(json["data"]["user"].get("password_hash").is_none());
}

/// A fresh user gets empty lists rather than an error.
#[sqlx::test(migrations = "../../migrations")]
async fn test_dashboard_empty(pool: PgPool) {
    let (_user_id, token) = seed_user(&pool, "newcomer").await;
    let app = common::build_test_app(pool);

    let response = get_auth(&app, "/api/v1/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["selling"], serde_json::json!([]));
    assert_eq!(json["data"]["bidding"], serde_json::json!([]));
}

/// A valid token for a deleted user is rejected.
#[sqlx::test(migrations = "../../migrations")]
async fn test_dashboard_deleted_user(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "ghost").await;
    let app = common::build_test_app(pool.clone());

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let response = get_auth(&app, "/api/v1/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
