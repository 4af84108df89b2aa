//! Bid entity model and read-side projections.

use aiforge_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A bid row from the `bids` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bid {
    pub id: DbId,
    pub auction_id: DbId,
    pub bidder_id: DbId,
    pub amount: Money,
    pub created_at: Timestamp,
}

/// A bid joined with the bidder's public name/avatar, for the detail page's
/// top-bids list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BidWithBidder {
    pub id: DbId,
    pub amount: Money,
    pub created_at: Timestamp,
    pub bidder_name: String,
    pub bidder_avatar_url: Option<String>,
}

/// One distinct auction a user has bid on, for the dashboard's bidding list.
/// Carries the user's most recent bid on that auction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BiddingSummary {
    pub auction_id: DbId,
    pub title: String,
    pub current_price: Money,
    pub ends_at: Timestamp,
    pub status: String,
    pub primary_image_url: Option<String>,
    pub seller_name: String,
    pub my_bid_amount: Money,
    pub my_bid_at: Timestamp,
}
