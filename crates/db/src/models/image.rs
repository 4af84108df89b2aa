//! Auction image model.

use aiforge_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// An image row from the `images` table. Owned by exactly one auction;
/// a partial unique index guarantees at most one primary image per auction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub auction_id: DbId,
    pub url: String,
    pub storage_key: String,
    pub is_primary: bool,
}
