//! Handlers for the `/auctions` resource: create, list, detail, lifecycle
//! transitions, and bid placement.

use aiforge_core::auction::{AuctionStatus, ImageInput, ListingInput};
use aiforge_core::error::CoreError;
use aiforge_core::types::{DbId, Money};
use aiforge_db::models::auction::{AuctionResponse, AuctionSummary};
use aiforge_db::models::bid::Bid;
use aiforge_db::repositories::{AuctionRepo, BidRepo, CancelError, CategoryRepo, PlaceBidError};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ListAuctionsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of top bids embedded in a detail response.
const TOP_BIDS: i64 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One image in a create request.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub url: String,
    pub storage_key: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Request body for `POST /auctions`.
#[derive(Debug, Deserialize)]
pub struct CreateAuctionRequest {
    pub title: String,
    pub description: String,
    pub category_id: DbId,
    pub starting_price: Money,
    pub reserve_price: Option<Money>,
    pub buyout_price: Option<Money>,
    /// Auction duration in days.
    pub duration: i64,
    pub tags: Vec<String>,
    pub images: Vec<ImageRequest>,
}

/// Request body for `POST /auctions/{id}/bids`.
#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub amount: Money,
}

/// One page of listings plus the cursor for the next page.
#[derive(Debug, Serialize)]
pub struct AuctionPageResponse {
    pub items: Vec<AuctionSummary>,
    pub next_cursor: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auctions
///
/// Create a Draft auction with its images in one atomic write. The seller is
/// the authenticated principal.
pub async fn create_auction(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAuctionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuctionResponse>>)> {
    let listing = ListingInput {
        title: input.title,
        description: input.description,
        starting_price: input.starting_price,
        reserve_price: input.reserve_price,
        buyout_price: input.buyout_price,
        duration_days: input.duration,
        tags: input.tags,
        images: input
            .images
            .into_iter()
            .map(|img| ImageInput {
                url: img.url,
                storage_key: img.storage_key,
                is_primary: img.is_primary,
            })
            .collect(),
    };
    listing.validate().map_err(AppError::Core)?;

    if CategoryRepo::find_by_id(&state.pool, input.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: input.category_id,
        }));
    }

    let ends_at = Utc::now() + Duration::days(listing.duration_days);
    let auction =
        AuctionRepo::create(&state.pool, auth.user_id, input.category_id, &listing, ends_at)
            .await?;

    tracing::info!(
        auction_id = auction.id,
        seller_id = auth.user_id,
        "Auction created",
    );

    let response = AuctionResponse::try_from(auction).map_err(AppError::Core)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/auctions
///
/// Cursor-paginated listing of active auctions, newest first, optionally
/// filtered by category.
pub async fn list_auctions(
    State(state): State<AppState>,
    Query(params): Query<ListAuctionsParams>,
) -> AppResult<Json<DataResponse<AuctionPageResponse>>> {
    let page = AuctionRepo::page(
        &state.pool,
        params.effective_limit(),
        params.cursor,
        params.category_id,
    )
    .await?;

    Ok(Json(DataResponse {
        data: AuctionPageResponse {
            items: page.items,
            next_cursor: page.next_cursor,
        },
    }))
}

/// GET /api/v1/auctions/{id}
///
/// Full auction detail. An Active auction whose end time has passed is swept
/// to Ended before the response is built.
pub async fn get_auction(
    State(state): State<AppState>,
    Path(auction_id): Path<DbId>,
) -> AppResult<Json<DataResponse<aiforge_db::models::auction::AuctionDetail>>> {
    let swept = AuctionRepo::mark_ended_if_due(&state.pool, auction_id).await?;
    if swept {
        tracing::info!(auction_id, "Auction swept to ended at read time");
    }

    let detail = AuctionRepo::detail(&state.pool, auction_id, TOP_BIDS)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Auction",
            id: auction_id,
        }))?;

    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/auctions/{id}/activate
///
/// Seller-only: publish a Draft auction so it starts accepting bids.
pub async fn activate_auction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(auction_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AuctionResponse>>> {
    transition_as_seller(&state, &auth, auction_id, AuctionStatus::Active).await
}

/// POST /api/v1/auctions/{id}/cancel
///
/// Seller-only: cancel an Active auction. Refused once bids exist. The
/// repository checks the no-bids rule under a row lock, so a bid committing
/// concurrently cannot be orphaned under a cancelled auction.
pub async fn cancel_auction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(auction_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AuctionResponse>>> {
    let cancelled = AuctionRepo::cancel_for_seller(&state.pool, auction_id, auth.user_id)
        .await
        .map_err(|err| match err {
            CancelError::AuctionNotFound => AppError::Core(CoreError::NotFound {
                entity: "Auction",
                id: auction_id,
            }),
            CancelError::NotSeller => AppError::Core(CoreError::Forbidden(
                "Only the seller may change this auction".into(),
            )),
            CancelError::HasBids => AppError::Core(CoreError::PreconditionFailed(
                "Cannot cancel an auction that already has bids".into(),
            )),
            CancelError::NotCancellable(from) => AppError::Core(CoreError::PreconditionFailed(
                format!("Cannot move auction from {from} to cancelled"),
            )),
            CancelError::Db(e) => AppError::Database(e),
            CancelError::Internal(msg) => AppError::InternalError(msg),
        })?;

    tracing::info!(auction_id, seller_id = auth.user_id, "Auction cancelled");

    let response = AuctionResponse::try_from(cancelled).map_err(AppError::Core)?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auctions/{id}/bids
///
/// Place a bid as the authenticated principal. The repository re-validates
/// under a row lock, so a concurrent bid cannot slip past a stale price.
pub async fn place_bid(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(auction_id): Path<DbId>,
    Json(input): Json<PlaceBidRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Bid>>)> {
    if input.amount <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Bid amount must be positive".into(),
        )));
    }

    let bid = BidRepo::place(&state.pool, auction_id, auth.user_id, input.amount)
        .await
        .map_err(|err| match err {
            PlaceBidError::AuctionNotFound => AppError::Core(CoreError::NotFound {
                entity: "Auction",
                id: auction_id,
            }),
            PlaceBidError::Rejected(rejection) => AppError::Core(rejection.into()),
            PlaceBidError::Db(e) => AppError::Database(e),
            PlaceBidError::Internal(msg) => AppError::InternalError(msg),
        })?;

    tracing::info!(
        auction_id,
        bidder_id = auth.user_id,
        amount = bid.amount,
        "Bid accepted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: bid })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an auction, enforce seller ownership and transition legality, then
/// apply the transition with a compare-and-swap on the current status.
async fn transition_as_seller(
    state: &AppState,
    auth: &AuthUser,
    auction_id: DbId,
    to: AuctionStatus,
) -> AppResult<Json<DataResponse<AuctionResponse>>> {
    let auction = AuctionRepo::find_by_id(&state.pool, auction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Auction",
            id: auction_id,
        }))?;

    if auction.seller_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the seller may change this auction".into(),
        )));
    }

    let from = auction.status().map_err(AppError::Core)?;
    if !from.can_transition_to(to) {
        return Err(AppError::Core(CoreError::PreconditionFailed(format!(
            "Cannot move auction from {from} to {to}"
        ))));
    }

    let applied = AuctionRepo::transition(&state.pool, auction_id, from, to).await?;
    if !applied {
        // The row moved on between the read and the CAS update.
        return Err(AppError::Core(CoreError::Conflict(
            "Auction status changed concurrently; retry".into(),
        )));
    }

    tracing::info!(auction_id, from = %from, to = %to, "Auction status changed");

    let updated = AuctionRepo::find_by_id(&state.pool, auction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Auction",
            id: auction_id,
        }))?;
    let response = AuctionResponse::try_from(updated).map_err(AppError::Core)?;
    Ok(Json(DataResponse { data: response }))
}
