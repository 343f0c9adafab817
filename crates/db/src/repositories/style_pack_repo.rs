//! Repository for the `style_packs` table.

use sqlx::PgPool;

use fondant_core::types::DbId;

use crate::models::style_pack::{CreateStylePack, StylePack};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, version, palette, allowed_decorations, banned_terms, \
    palette_lock_strength, style_strength, sharpness, realism, complexity, uniformity, \
    shape_template, trend_keywords, trend_techniques, is_active, created_at, updated_at";

/// Provides CRUD operations for style packs.
pub struct StylePackRepo;

impl StylePackRepo {
    /// Insert a new style pack at version 1, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateStylePack) -> Result<StylePack, sqlx::Error> {
        let query = format!(
            "INSERT INTO style_packs
                (name, version, palette, allowed_decorations, banned_terms,
                 palette_lock_strength, style_strength, sharpness, realism,
                 complexity, uniformity, shape_template, trend_keywords, trend_techniques)
             VALUES ($1, 1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StylePack>(&query)
            .bind(&input.name)
            .bind(&input.palette)
            .bind(&input.allowed_decorations)
            .bind(&input.banned_terms)
            .bind(input.palette_lock_strength)
            .bind(input.intensity.style_strength)
            .bind(input.intensity.sharpness)
            .bind(input.intensity.realism)
            .bind(input.intensity.complexity)
            .bind(input.intensity.uniformity)
            .bind(&input.shape_template)
            .bind(&input.trend_keywords)
            .bind(&input.trend_techniques)
            .fetch_one(pool)
            .await
    }

    /// Find a style pack by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StylePack>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM style_packs WHERE id = $1");
        sqlx::query_as::<_, StylePack>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active style packs, newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<StylePack>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM style_packs
             WHERE is_active = true
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, StylePack>(&query).fetch_all(pool).await
    }

    /// Publish a new version of an existing pack: copies the row with the
    /// supplied fields and bumps `version`, leaving prior versions intact.
    ///
    /// Returns `None` if no pack with the given `id` exists.
    pub async fn publish_revision(
        pool: &PgPool,
        id: DbId,
        input: &CreateStylePack,
    ) -> Result<Option<StylePack>, sqlx::Error> {
        let query = format!(
            "INSERT INTO style_packs
                (name, version, palette, allowed_decorations, banned_terms,
                 palette_lock_strength, style_strength, sharpness, realism,
                 complexity, uniformity, shape_template, trend_keywords, trend_techniques)
             SELECT $2, version + 1, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
             FROM style_packs WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StylePack>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.palette)
            .bind(&input.allowed_decorations)
            .bind(&input.banned_terms)
            .bind(input.palette_lock_strength)
            .bind(input.intensity.style_strength)
            .bind(input.intensity.sharpness)
            .bind(input.intensity.realism)
            .bind(input.intensity.complexity)
            .bind(input.intensity.uniformity)
            .bind(&input.shape_template)
            .bind(&input.trend_keywords)
            .bind(&input.trend_techniques)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a style pack. Returns `true` if a row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE style_packs SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
