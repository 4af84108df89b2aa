//! Category reference data (seeded by migration, read-only at runtime).

use aiforge_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
}
