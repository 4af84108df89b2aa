//! Pure domain logic for the AIForge auction marketplace.
//!
//! No I/O lives here: the auction status state machine, listing-input
//! validation, and the bid-acceptance rule are all plain functions so the
//! persistence and HTTP layers can share them (and so they unit-test without
//! a database).

pub mod auction;
pub mod error;
pub mod types;
