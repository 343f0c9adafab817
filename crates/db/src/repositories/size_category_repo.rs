//! Repository for the `size_categories` table.

use sqlx::PgPool;

use fondant_core::types::DbId;

use crate::models::size_category::{CreateSizeCategory, SizeCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, tier_count, serves_min, serves_max, \
    price_min_cents, price_max_cents, default_shape, is_active, created_at, updated_at";

/// Provides CRUD operations for size categories.
pub struct SizeCategoryRepo;

impl SizeCategoryRepo {
    /// Insert a new size category, returning the created row.
    ///
    /// If `default_shape` is `None`, defaults to `'round'`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSizeCategory,
    ) -> Result<SizeCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO size_categories
                (name, tier_count, serves_min, serves_max, price_min_cents, price_max_cents, default_shape)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'round'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SizeCategory>(&query)
            .bind(&input.name)
            .bind(input.tier_count)
            .bind(input.serves_min)
            .bind(input.serves_max)
            .bind(input.price_min_cents)
            .bind(input.price_max_cents)
            .bind(&input.default_shape)
            .fetch_one(pool)
            .await
    }

    /// Find a size category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SizeCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM size_categories WHERE id = $1");
        sqlx::query_as::<_, SizeCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active size categories, smallest tier count first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<SizeCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM size_categories
             WHERE is_active = true
             ORDER BY tier_count ASC, name ASC"
        );
        sqlx::query_as::<_, SizeCategory>(&query)
            .fetch_all(pool)
            .await
    }

    /// Deactivate a size category. Returns `true` if a row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE size_categories SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
