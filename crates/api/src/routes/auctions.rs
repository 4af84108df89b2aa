//! Route definitions for the `/auctions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auctions;
use crate::state::AppState;

/// Routes mounted at `/auctions`.
///
/// ```text
/// GET  /               -> list_auctions
/// POST /               -> create_auction (auth)
/// GET  /{id}           -> get_auction
/// POST /{id}/activate  -> activate_auction (seller)
/// POST /{id}/cancel    -> cancel_auction (seller)
/// POST /{id}/bids      -> place_bid (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(auctions::list_auctions).post(auctions::create_auction),
        )
        .route("/{id}", get(auctions::get_auction))
        .route("/{id}/activate", post(auctions::activate_auction))
        .route("/{id}/cancel", post(auctions::cancel_auction))
        .route("/{id}/bids", post(auctions::place_bid))
}
