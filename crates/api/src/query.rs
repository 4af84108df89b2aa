//! Shared query parameter types for API handlers.

use aiforge_core::types::DbId;
use serde::Deserialize;

/// Default page size for the auction listing.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Maximum page size for the auction listing.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Cursor pagination parameters for the auction listing
/// (`?limit=&cursor=&category_id=`).
///
/// `cursor` is opaque to clients: it is the `next_cursor` value returned by
/// the previous page (internally, the id of that page's last row).
#[derive(Debug, Deserialize)]
pub struct ListAuctionsParams {
    pub limit: Option<i64>,
    pub cursor: Option<DbId>,
    pub category_id: Option<DbId>,
}

impl ListAuctionsParams {
    /// Effective page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}
