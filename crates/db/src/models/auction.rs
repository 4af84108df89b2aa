//! Auction entity model, DTOs, and read-side projections.

use aiforge_core::auction::{AuctionStatus, StatusId};
use aiforge_core::error::CoreError;
use aiforge_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::category::Category;
use crate::models::image::Image;

/// An auction row from the `auctions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Auction {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starting_price: Money,
    pub current_price: Money,
    pub reserve_price: Option<Money>,
    pub buyout_price: Option<Money>,
    pub ends_at: Timestamp,
    pub status_id: StatusId,
    pub seller_id: DbId,
    pub category_id: DbId,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Auction {
    /// Resolve the raw `status_id` to the domain enum.
    pub fn status(&self) -> Result<AuctionStatus, CoreError> {
        AuctionStatus::from_id(self.status_id)
    }
}

/// Serialized auction representation for API responses (status as string).
#[derive(Debug, Clone, Serialize)]
pub struct AuctionResponse {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starting_price: Money,
    pub current_price: Money,
    pub reserve_price: Option<Money>,
    pub buyout_price: Option<Money>,
    pub ends_at: Timestamp,
    pub status: AuctionStatus,
    pub seller_id: DbId,
    pub category_id: DbId,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}

impl TryFrom<Auction> for AuctionResponse {
    type Error = CoreError;

    fn try_from(auction: Auction) -> Result<Self, Self::Error> {
        let status = auction.status()?;
        Ok(Self {
            id: auction.id,
            title: auction.title,
            description: auction.description,
            starting_price: auction.starting_price,
            current_price: auction.current_price,
            reserve_price: auction.reserve_price,
            buyout_price: auction.buyout_price,
            ends_at: auction.ends_at,
            status,
            seller_id: auction.seller_id,
            category_id: auction.category_id,
            tags: auction.tags,
            created_at: auction.created_at,
        })
    }
}

/// One row of a paginated listing (or a seller's dashboard): auction fields
/// joined with its primary image, the seller's public name/avatar, and the
/// bid count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuctionSummary {
    pub id: DbId,
    pub title: String,
    pub current_price: Money,
    pub buyout_price: Option<Money>,
    pub ends_at: Timestamp,
    /// Status name resolved from the `auction_statuses` lookup table.
    pub status: String,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub primary_image_url: Option<String>,
    pub seller_name: String,
    pub seller_avatar_url: Option<String>,
    pub bid_count: i64,
}

/// Seller fields exposed on the auction detail page. The seller's email is
/// deliberately absent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SellerPublic {
    pub id: DbId,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Full auction detail: the auction, its seller and category, every image,
/// the top bids, and the total bid count.
#[derive(Debug, Serialize)]
pub struct AuctionDetail {
    #[serde(flatten)]
    pub auction: AuctionResponse,
    pub seller: SellerPublic,
    pub category: Category,
    pub images: Vec<Image>,
    pub top_bids: Vec<crate::models::bid::BidWithBidder>,
    pub bid_count: i64,
}
