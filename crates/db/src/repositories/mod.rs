//! Repository layer: unit structs with static async methods over `PgPool`.

mod auction_repo;
mod bid_repo;
mod category_repo;
mod user_repo;

pub use auction_repo::{AuctionPage, AuctionRepo, CancelError};
pub use bid_repo::{BidRepo, PlaceBidError};
pub use category_repo::CategoryRepo;
pub use user_repo::UserRepo;
