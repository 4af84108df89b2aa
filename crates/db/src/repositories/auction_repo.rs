//! Repository for the `auctions` table and its owned `images`.

use aiforge_core::auction::{AuctionStatus, ListingInput};
use aiforge_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::auction::{Auction, AuctionDetail, AuctionSummary, SellerPublic};
use crate::models::category::Category;
use crate::models::image::Image;
use crate::repositories::BidRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, starting_price, current_price, reserve_price, \
                       buyout_price, ends_at, status_id, seller_id, category_id, tags, \
                       created_at, updated_at";

/// Joined projection used by both the public listing and the seller
/// dashboard: primary image, seller public fields, and bid count.
const SUMMARY_SELECT: &str = "SELECT a.id, a.title, a.current_price, a.buyout_price, a.ends_at, \
            s.name AS status, a.tags, a.created_at, \
            img.url AS primary_image_url, \
            u.name AS seller_name, u.avatar_url AS seller_avatar_url, \
            (SELECT COUNT(*) FROM bids b WHERE b.auction_id = a.id) AS bid_count \
     FROM auctions a \
     JOIN users u ON u.id = a.seller_id \
     JOIN auction_statuses s ON s.id = a.status_id \
     LEFT JOIN images img ON img.auction_id = a.id AND img.is_primary";

/// One page of active listings plus the cursor for the next page, if any.
#[derive(Debug)]
pub struct AuctionPage {
    pub items: Vec<AuctionSummary>,
    pub next_cursor: Option<DbId>,
}

/// Outcome of a failed cancellation.
#[derive(Debug, thiserror::Error)]
pub enum CancelError {
    #[error("Auction not found")]
    AuctionNotFound,

    #[error("Not the seller")]
    NotSeller,

    /// The auction already has bids; bidders are committed.
    #[error("Auction has bids")]
    HasBids,

    /// The auction is not in a cancellable status.
    #[error("Not cancellable from {0}")]
    NotCancellable(AuctionStatus),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Provides persistence operations for auctions.
pub struct AuctionRepo;

impl AuctionRepo {
    /// Insert a new auction in Draft status together with all its images,
    /// atomically. `current_price` starts at the starting price.
    ///
    /// The caller is responsible for having validated `listing`; the primary
    /// flag is taken from [`ListingInput::primary_image_index`] so exactly
    /// one image ends up primary.
    pub async fn create(
        pool: &PgPool,
        seller_id: DbId,
        category_id: DbId,
        listing: &ListingInput,
        ends_at: Timestamp,
    ) -> Result<Auction, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO auctions (title, description, starting_price, current_price, \
                                   reserve_price, buyout_price, ends_at, status_id, \
                                   seller_id, category_id, tags)
             VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let auction = sqlx::query_as::<_, Auction>(&query)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.starting_price)
            .bind(listing.reserve_price)
            .bind(listing.buyout_price)
            .bind(ends_at)
            .bind(AuctionStatus::Draft.id())
            .bind(seller_id)
            .bind(category_id)
            .bind(&listing.tags)
            .fetch_one(&mut *tx)
            .await?;

        let primary_index = listing.primary_image_index();
        for (index, image) in listing.images.iter().enumerate() {
            sqlx::query(
                "INSERT INTO images (auction_id, url, storage_key, is_primary)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(auction.id)
            .bind(&image.url)
            .bind(&image.storage_key)
            .bind(index == primary_index)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(auction)
    }

    /// Find an auction by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Auction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM auctions WHERE id = $1");
        sqlx::query_as::<_, Auction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of active listings, newest first, keyset-paginated.
    ///
    /// `cursor` is the id of the last row of the previous page; rows are
    /// ordered by `(created_at, id)` descending so creation-time ties stay
    /// stable across pages. One extra row is fetched to detect whether a
    /// further page exists. Auctions whose end time has passed but have not
    /// yet been swept to Ended are filtered out by the `ends_at` predicate.
    pub async fn page(
        pool: &PgPool,
        limit: i64,
        cursor: Option<DbId>,
        category_id: Option<DbId>,
    ) -> Result<AuctionPage, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE a.status_id = $1
               AND a.ends_at > NOW()
               AND ($2::BIGINT IS NULL OR a.category_id = $2)
               AND ($3::BIGINT IS NULL OR
                    (a.created_at, a.id) < (SELECT c.created_at, c.id
                                            FROM auctions c WHERE c.id = $3))
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT $4"
        );
        let mut items = sqlx::query_as::<_, AuctionSummary>(&query)
            .bind(AuctionStatus::Active.id())
            .bind(category_id)
            .bind(cursor)
            .bind(limit + 1)
            .fetch_all(pool)
            .await?;

        let next_cursor = if items.len() as i64 > limit {
            items.pop();
            items.last().map(|item| item.id)
        } else {
            None
        };

        Ok(AuctionPage { items, next_cursor })
    }

    /// Full detail for one auction: seller public profile, category, all
    /// images, top bids with bidder info, and the total bid count.
    ///
    /// Returns `None` if the auction does not exist.
    pub async fn detail(
        pool: &PgPool,
        id: DbId,
        top_bid_limit: i64,
    ) -> Result<Option<AuctionDetail>, sqlx::Error> {
        let Some(auction) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let seller = sqlx::query_as::<_, SellerPublic>(
            "SELECT id, name, avatar_url FROM users WHERE id = $1",
        )
        .bind(auction.seller_id)
        .fetch_one(pool)
        .await?;

        let category = sqlx::query_as::<_, Category>(
            "SELECT id, slug, name, description FROM categories WHERE id = $1",
        )
        .bind(auction.category_id)
        .fetch_one(pool)
        .await?;

        let images = sqlx::query_as::<_, Image>(
            "SELECT id, auction_id, url, storage_key, is_primary
             FROM images WHERE auction_id = $1
             ORDER BY is_primary DESC, id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let top_bids = BidRepo::top_for_auction(pool, id, top_bid_limit).await?;
        let bid_count = BidRepo::count_for_auction(pool, id).await?;

        let auction = auction
            .try_into()
            .map_err(|e| sqlx::Error::Decode(format!("{e}").into()))?;

        Ok(Some(AuctionDetail {
            auction,
            seller,
            category,
            images,
            top_bids,
            bid_count,
        }))
    }

    /// All auctions a user is selling, newest first, with primary image and
    /// bid count.
    pub async fn selling_for_user(
        pool: &PgPool,
        seller_id: DbId,
    ) -> Result<Vec<AuctionSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE a.seller_id = $1
             ORDER BY a.created_at DESC, a.id DESC"
        );
        sqlx::query_as::<_, AuctionSummary>(&query)
            .bind(seller_id)
            .fetch_all(pool)
            .await
    }

    /// Compare-and-swap a status transition: the update only applies while
    /// the row is still in `from`. Returns `false` if the row was missing or
    /// had already moved on.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE auctions SET status_id = $3, updated_at = NOW()
             WHERE id = $1 AND status_id = $2",
        )
        .bind(id)
        .bind(from.id())
        .bind(to.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cancel an auction on the seller's behalf: lock the row, re-check
    /// ownership, status, and the no-bids rule against the locked state,
    /// then apply the transition in the same transaction.
    ///
    /// The `SELECT ... FOR UPDATE` serializes this against an in-flight bid
    /// transaction holding the same row lock: the cancel waits for the bid
    /// to commit and then sees its row, so a Cancelled auction can never
    /// end up with bids.
    pub async fn cancel_for_seller(
        pool: &PgPool,
        id: DbId,
        seller_id: DbId,
    ) -> Result<Auction, CancelError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM auctions WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, Auction>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(auction) = row else {
            return Err(CancelError::AuctionNotFound);
        };
        if auction.seller_id != seller_id {
            return Err(CancelError::NotSeller);
        }

        let from = auction
            .status()
            .map_err(|e| CancelError::Internal(e.to_string()))?;
        if !from.can_transition_to(AuctionStatus::Cancelled) {
            return Err(CancelError::NotCancellable(from));
        }

        let (bid_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bids WHERE auction_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if bid_count > 0 {
            return Err(CancelError::HasBids);
        }

        let query = format!(
            "UPDATE auctions SET status_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let cancelled = sqlx::query_as::<_, Auction>(&query)
            .bind(id)
            .bind(AuctionStatus::Cancelled.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    /// Lazily sweep an Active auction to Ended once its end time has passed.
    /// Returns `true` if this call performed the transition.
    pub async fn mark_ended_if_due(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE auctions SET status_id = $2, updated_at = NOW()
             WHERE id = $1 AND status_id = $3 AND ends_at < NOW()",
        )
        .bind(id)
        .bind(AuctionStatus::Ended.id())
        .bind(AuctionStatus::Active.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
