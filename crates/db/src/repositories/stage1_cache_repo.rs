//! Repository for the `stage1_cache` table.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use fondant_core::cache_key::{Stage1Key, STAGE1_CACHE_TTL_HOURS};

use crate::models::stage1_cache::Stage1CacheEntry;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, style_pack_id, brief_hash, size_category_id, \
    payload, expires_at, created_at, updated_at";

/// Provides read-through cache operations for stage-1 draft results.
pub struct Stage1CacheRepo;

impl Stage1CacheRepo {
    /// Look up a live cache entry for the key. Expired rows are treated as
    /// absent; they stay in place until the next `put` or `purge_expired`.
    pub async fn get(
        pool: &PgPool,
        key: &Stage1Key,
    ) -> Result<Option<Stage1CacheEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stage1_cache
             WHERE style_pack_id = $1 AND brief_hash = $2 AND size_category_id = $3
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Stage1CacheEntry>(&query)
            .bind(key.style_pack_id)
            .bind(&key.brief_hash)
            .bind(key.size_category_id)
            .fetch_optional(pool)
            .await
    }

    /// Store a payload under the key, replacing any prior entry and
    /// restarting the TTL from now.
    pub async fn put(
        pool: &PgPool,
        key: &Stage1Key,
        payload: &serde_json::Value,
    ) -> Result<Stage1CacheEntry, sqlx::Error> {
        let expires_at = Utc::now() + Duration::hours(STAGE1_CACHE_TTL_HOURS);
        let query = format!(
            "INSERT INTO stage1_cache
                (style_pack_id, brief_hash, size_category_id, payload, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (style_pack_id, brief_hash, size_category_id) DO UPDATE SET
                payload = EXCLUDED.payload,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Stage1CacheEntry>(&query)
            .bind(key.style_pack_id)
            .bind(&key.brief_hash)
            .bind(key.size_category_id)
            .bind(payload)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Push an existing entry's expiry out by a full TTL from now. Returns
    /// `true` if a live row was refreshed.
    pub async fn touch(pool: &PgPool, key: &Stage1Key) -> Result<bool, sqlx::Error> {
        let expires_at = Utc::now() + Duration::hours(STAGE1_CACHE_TTL_HOURS);
        let result = sqlx::query(
            "UPDATE stage1_cache SET expires_at = $4, updated_at = NOW()
             WHERE style_pack_id = $1 AND brief_hash = $2 AND size_category_id = $3
               AND expires_at > NOW()",
        )
        .bind(key.style_pack_id)
        .bind(&key.brief_hash)
        .bind(key.size_category_id)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete expired rows, returning how many were removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stage1_cache WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
