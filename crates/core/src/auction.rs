//! Auction lifecycle state machine, listing-input validation, and the
//! bid-acceptance rule.
//!
//! `check_bid` is deliberately a pure function over a snapshot of the auction
//! row: the persistence layer calls it *after* taking a row lock, so the
//! values it sees cannot be raced by a concurrent bidder.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Money, Timestamp};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Auction lifecycle status.
///
/// Discriminants match the seed order (1-based) of the `auction_statuses`
/// lookup table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Draft = 1,
    Active = 2,
    Ended = 3,
    Cancelled = 4,
}

impl AuctionStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Resolve a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Draft),
            2 => Ok(Self::Active),
            3 => Ok(Self::Ended),
            4 => Ok(Self::Cancelled),
            other => Err(CoreError::Internal(format!(
                "Unknown auction status id: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        }
    }

    /// Ended and Cancelled are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }

    /// Legal lifecycle transitions:
    ///
    /// ```text
    /// Draft -> Active
    /// Active -> Ended
    /// Active -> Cancelled
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Active)
                | (Self::Active, Self::Ended)
                | (Self::Active, Self::Cancelled)
        )
    }
}

impl From<AuctionStatus> for StatusId {
    fn from(value: AuctionStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Listing validation
// ---------------------------------------------------------------------------

pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 50;

/// One image attached to a new listing.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub url: String,
    pub storage_key: String,
    pub is_primary: bool,
}

/// Validated shape of a new listing, before persistence details (seller,
/// category resolution) come into play.
#[derive(Debug, Clone)]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    pub starting_price: Money,
    pub reserve_price: Option<Money>,
    pub buyout_price: Option<Money>,
    pub duration_days: i64,
    pub tags: Vec<String>,
    pub images: Vec<ImageInput>,
}

impl ListingInput {
    /// Check every field constraint, returning the first violation.
    pub fn validate(&self) -> Result<(), CoreError> {
        let title_len = self.title.chars().count();
        if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
            return Err(CoreError::Validation(format!(
                "Title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"
            )));
        }
        if self.description.chars().count() < DESCRIPTION_MIN_CHARS {
            return Err(CoreError::Validation(format!(
                "Description must be at least {DESCRIPTION_MIN_CHARS} characters"
            )));
        }
        if self.starting_price < 1 {
            return Err(CoreError::Validation(
                "Starting price must be at least 1".into(),
            ));
        }
        if let Some(reserve) = self.reserve_price {
            if reserve < self.starting_price {
                return Err(CoreError::Validation(
                    "Reserve price cannot be below the starting price".into(),
                ));
            }
        }
        if let Some(buyout) = self.buyout_price {
            if buyout < self.starting_price {
                return Err(CoreError::Validation(
                    "Buyout price cannot be below the starting price".into(),
                ));
            }
        }
        if self.duration_days < 1 {
            return Err(CoreError::Validation(
                "Duration must be at least 1 day".into(),
            ));
        }
        if self.tags.is_empty() || self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(CoreError::Validation(
                "At least one non-empty tag is required".into(),
            ));
        }
        if self.images.is_empty() {
            return Err(CoreError::Validation(
                "At least one image is required".into(),
            ));
        }
        if self.images.iter().filter(|i| i.is_primary).count() > 1 {
            return Err(CoreError::Validation(
                "Only one image may be marked primary".into(),
            ));
        }
        Ok(())
    }

    /// Index of the primary image. When no image is flagged, the first one
    /// is promoted so every listing has exactly one primary image.
    pub fn primary_image_index(&self) -> usize {
        self.images
            .iter()
            .position(|i| i.is_primary)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Bid acceptance
// ---------------------------------------------------------------------------

/// Why a bid was refused. Converts into [`CoreError::PreconditionFailed`]
/// with a caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidRejection {
    /// The auction's end time has passed (or it is already Ended).
    Ended,
    /// The auction is not in a biddable status (Draft or Cancelled).
    NotOpen(AuctionStatus),
    /// The bidder is the auction's seller.
    SelfBid,
    /// The amount does not exceed the current price.
    TooLow { current: Money },
}

impl From<BidRejection> for CoreError {
    fn from(rejection: BidRejection) -> Self {
        let message = match rejection {
            BidRejection::Ended => "Auction has ended".to_string(),
            BidRejection::NotOpen(status) => {
                format!("Auction is not open for bidding (status: {status})")
            }
            BidRejection::SelfBid => "You cannot bid on your own auction".to_string(),
            BidRejection::TooLow { current } => {
                format!("Bid must be higher than current price ({current})")
            }
        };
        CoreError::PreconditionFailed(message)
    }
}

/// Decide whether a bid is acceptable against a snapshot of the auction row.
///
/// Call this with values read under the bid transaction's row lock; the
/// decision is only race-free if the row cannot change underneath it.
pub fn check_bid(
    status: AuctionStatus,
    ends_at: Timestamp,
    current_price: Money,
    seller_id: DbId,
    bidder_id: DbId,
    amount: Money,
    now: Timestamp,
) -> Result<(), BidRejection> {
    if status == AuctionStatus::Ended || (status == AuctionStatus::Active && now > ends_at) {
        return Err(BidRejection::Ended);
    }
    if status != AuctionStatus::Active {
        return Err(BidRejection::NotOpen(status));
    }
    if bidder_id == seller_id {
        return Err(BidRejection::SelfBid);
    }
    if amount <= current_price {
        return Err(BidRejection::TooLow {
            current: current_price,
        });
    }
    Ok(())
}
