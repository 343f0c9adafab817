//! Repository for the `reference_images` table.

use sqlx::PgPool;

use fondant_core::types::DbId;

use crate::models::reference_image::{CreateReferenceImage, ReferenceAnalysis, ReferenceImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, style_pack_id, storage_key, palette, texture_tags, \
    density_id, embedding, analyzed_at, created_at, updated_at";

/// Provides CRUD operations for reference images.
pub struct ReferenceImageRepo;

impl ReferenceImageRepo {
    /// Register an uploaded image, returning the created row.
    ///
    /// Re-registering the same `(style_pack_id, storage_key)` pair is a
    /// no-op that returns the existing row unchanged.
    pub async fn create_pending(
        pool: &PgPool,
        input: &CreateReferenceImage,
    ) -> Result<ReferenceImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO reference_images (style_pack_id, storage_key)
             VALUES ($1, $2)
             ON CONFLICT (style_pack_id, storage_key) DO UPDATE
                 SET updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReferenceImage>(&query)
            .bind(input.style_pack_id)
            .bind(&input.storage_key)
            .fetch_one(pool)
            .await
    }

    /// Write analysis results onto an image, marking it analyzed.
    ///
    /// Inserts the row if the image was never registered, so analysis and
    /// upload order is not load-bearing. Re-analysis overwrites prior
    /// results and refreshes `analyzed_at`.
    pub async fn upsert_analysis(
        pool: &PgPool,
        style_pack_id: DbId,
        storage_key: &str,
        analysis: &ReferenceAnalysis,
    ) -> Result<ReferenceImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO reference_images
                (style_pack_id, storage_key, palette, texture_tags, density_id, embedding, analyzed_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (style_pack_id, storage_key) DO UPDATE SET
                palette = EXCLUDED.palette,
                texture_tags = EXCLUDED.texture_tags,
                density_id = EXCLUDED.density_id,
                embedding = EXCLUDED.embedding,
                analyzed_at = NOW(),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReferenceImage>(&query)
            .bind(style_pack_id)
            .bind(storage_key)
            .bind(&analysis.palette)
            .bind(&analysis.texture_tags)
            .bind(analysis.density_id)
            .bind(&analysis.embedding)
            .fetch_one(pool)
            .await
    }

    /// Find a reference image by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReferenceImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reference_images WHERE id = $1");
        sqlx::query_as::<_, ReferenceImage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all images for a pack, oldest first.
    pub async fn list_for_pack(
        pool: &PgPool,
        style_pack_id: DbId,
    ) -> Result<Vec<ReferenceImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reference_images
             WHERE style_pack_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ReferenceImage>(&query)
            .bind(style_pack_id)
            .fetch_all(pool)
            .await
    }

    /// List analyzed images for a pack, oldest first. These are the rows
    /// eligible to back style-profile assembly.
    pub async fn list_analyzed_for_pack(
        pool: &PgPool,
        style_pack_id: DbId,
    ) -> Result<Vec<ReferenceImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reference_images
             WHERE style_pack_id = $1 AND analyzed_at IS NOT NULL
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ReferenceImage>(&query)
            .bind(style_pack_id)
            .fetch_all(pool)
            .await
    }

    /// List images for a pack that have not been analyzed yet, oldest first.
    pub async fn list_pending_for_pack(
        pool: &PgPool,
        style_pack_id: DbId,
    ) -> Result<Vec<ReferenceImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reference_images
             WHERE style_pack_id = $1 AND analyzed_at IS NULL
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ReferenceImage>(&query)
            .bind(style_pack_id)
            .fetch_all(pool)
            .await
    }

    /// Count all uploaded images for a pack, analyzed or not.
    pub async fn count_for_pack(pool: &PgPool, style_pack_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reference_images WHERE style_pack_id = $1")
                .bind(style_pack_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Delete a reference image by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reference_images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
