//! Entity models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create DTOs for inserts
//! - Read-side projection structs for joined query results

pub mod auction;
pub mod bid;
pub mod category;
pub mod image;
pub mod user;
