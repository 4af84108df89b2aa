//! Handler for the authenticated user's dashboard aggregation.

use aiforge_core::error::CoreError;
use aiforge_db::models::auction::AuctionSummary;
use aiforge_db::models::bid::BiddingSummary;
use aiforge_db::models::user::UserProfile;
use aiforge_db::repositories::{AuctionRepo, BidRepo, UserRepo};
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Dashboard payload: what the user is selling, what they are bidding on,
/// and their profile.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub selling: Vec<AuctionSummary>,
    pub bidding: Vec<BiddingSummary>,
    pub user: UserProfile,
}

/// GET /api/v1/dashboard
///
/// The three reads are independent, so they run concurrently on the pool.
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    let (selling, bidding, user) = tokio::try_join!(
        AuctionRepo::selling_for_user(&state.pool, auth.user_id),
        BidRepo::bidding_for_user(&state.pool, auth.user_id),
        UserRepo::find_by_id(&state.pool, auth.user_id),
    )?;

    // A valid token for a deleted row: treat as unauthenticated.
    let user = user.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
    })?;

    Ok(Json(DataResponse {
        data: DashboardResponse {
            selling,
            bidding,
            user: user.into(),
        },
    }))
}
