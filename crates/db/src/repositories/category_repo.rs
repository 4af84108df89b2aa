//! Repository for the `categories` reference table.

use aiforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::Category;

pub struct CategoryRepo;

impl CategoryRepo {
    /// List all categories in display order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, slug, name, description FROM categories ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    /// Find a category by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, slug, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
