//! Repository for the `bids` table, including the bid-placement transaction.

use aiforge_core::auction::{check_bid, AuctionStatus, BidRejection, StatusId};
use aiforge_core::types::{DbId, Money, Timestamp};
use chrono::Utc;
use sqlx::PgPool;

use crate::models::bid::{Bid, BidWithBidder, BiddingSummary};

/// Outcome of a failed bid placement.
#[derive(Debug, thiserror::Error)]
pub enum PlaceBidError {
    #[error("Auction not found")]
    AuctionNotFound,

    /// The bid failed a business rule (ended, too low, self-bid, not open).
    #[error("Bid rejected")]
    Rejected(BidRejection),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Snapshot of the auction fields the acceptance rule needs, read under
/// `FOR UPDATE` inside the bid transaction.
#[derive(Debug, sqlx::FromRow)]
struct AuctionLockRow {
    seller_id: DbId,
    status_id: StatusId,
    ends_at: Timestamp,
    current_price: Money,
}

/// Provides persistence operations for bids.
pub struct BidRepo;

impl BidRepo {
    /// Place a bid: lock the auction row, re-validate against the locked
    /// values, then insert the bid and raise `current_price` in the same
    /// transaction.
    ///
    /// The `SELECT ... FOR UPDATE` serializes concurrent bidders on the same
    /// auction: the second transaction blocks until the first commits, then
    /// validates against the updated price, so the two writes can never both
    /// accept against the same stale price.
    ///
    /// If the auction's end time passed while it was still Active, this call
    /// also persists the Active -> Ended transition before rejecting.
    pub async fn place(
        pool: &PgPool,
        auction_id: DbId,
        bidder_id: DbId,
        amount: Money,
    ) -> Result<Bid, PlaceBidError> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, AuctionLockRow>(
            "SELECT seller_id, status_id, ends_at, current_price
             FROM auctions WHERE id = $1
             FOR UPDATE",
        )
        .bind(auction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(auction) = row else {
            return Err(PlaceBidError::AuctionNotFound);
        };

        let status = AuctionStatus::from_id(auction.status_id)
            .map_err(|e| PlaceBidError::Internal(e.to_string()))?;
        let now = Utc::now();

        if let Err(rejection) = check_bid(
            status,
            auction.ends_at,
            auction.current_price,
            auction.seller_id,
            bidder_id,
            amount,
            now,
        ) {
            // Lazy sweep: persist the end transition we just observed, even
            // though the bid itself is refused.
            if rejection == BidRejection::Ended && status == AuctionStatus::Active {
                sqlx::query(
                    "UPDATE auctions SET status_id = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(auction_id)
                .bind(AuctionStatus::Ended.id())
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                tracing::info!(auction_id, "Auction swept to ended at bid time");
            }
            return Err(PlaceBidError::Rejected(rejection));
        }

        let bid = sqlx::query_as::<_, Bid>(
            "INSERT INTO bids (auction_id, bidder_id, amount)
             VALUES ($1, $2, $3)
             RETURNING id, auction_id, bidder_id, amount, created_at",
        )
        .bind(auction_id)
        .bind(bidder_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE auctions SET current_price = $2, updated_at = NOW() WHERE id = $1")
            .bind(auction_id)
            .bind(amount)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bid)
    }

    /// Top bids for an auction, highest first, with bidder public fields.
    pub async fn top_for_auction(
        pool: &PgPool,
        auction_id: DbId,
        limit: i64,
    ) -> Result<Vec<BidWithBidder>, sqlx::Error> {
        sqlx::query_as::<_, BidWithBidder>(
            "SELECT b.id, b.amount, b.created_at,
                    u.name AS bidder_name, u.avatar_url AS bidder_avatar_url
             FROM bids b
             JOIN users u ON u.id = b.bidder_id
             WHERE b.auction_id = $1
             ORDER BY b.amount DESC, b.id
             LIMIT $2",
        )
        .bind(auction_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Total number of bids on an auction.
    pub async fn count_for_auction(pool: &PgPool, auction_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bids WHERE auction_id = $1")
                .bind(auction_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Distinct auctions a user has bid on, most recent bid first. Each row
    /// carries the user's latest bid on that auction plus the auction's
    /// primary image and seller name.
    pub async fn bidding_for_user(
        pool: &PgPool,
        bidder_id: DbId,
    ) -> Result<Vec<BiddingSummary>, sqlx::Error> {
        sqlx::query_as::<_, BiddingSummary>(
            "SELECT * FROM (
                 SELECT DISTINCT ON (b.auction_id)
                        b.auction_id, a.title, a.current_price, a.ends_at,
                        s.name AS status,
                        img.url AS primary_image_url,
                        u.name AS seller_name,
                        b.amount AS my_bid_amount,
                        b.created_at AS my_bid_at
                 FROM bids b
                 JOIN auctions a ON a.id = b.auction_id
                 JOIN auction_statuses s ON s.id = a.status_id
                 JOIN users u ON u.id = a.seller_id
                 LEFT JOIN images img ON img.auction_id = a.id AND img.is_primary
                 WHERE b.bidder_id = $1
                 ORDER BY b.auction_id, b.created_at DESC, b.id DESC
             ) latest
             ORDER BY latest.my_bid_at DESC",
        )
        .bind(bidder_id)
        .fetch_all(pool)
        .await
    }
}
