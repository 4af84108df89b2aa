pub mod auctions;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
///
/// /categories                      list categories (public)
///
/// /auctions                        list (public), create (auth)
/// /auctions/{id}                   detail (public)
/// /auctions/{id}/activate          publish draft (seller)
/// /auctions/{id}/cancel            cancel active (seller)
/// /auctions/{id}/bids              place bid (auth)
///
/// /dashboard                       selling + bidding overview (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/auctions", auctions::router())
        .nest("/dashboard", dashboard::router())
}
