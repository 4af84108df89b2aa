pub mod auctions;
pub mod auth;
pub mod categories;
pub mod dashboard;
