//! Stage-1 cache entry: reusable draft results keyed by pack, brief and size.

use serde::Serialize;
use sqlx::FromRow;

use fondant_core::types::{DbId, Timestamp};

/// A row from the `stage1_cache` table.
///
/// `payload` is the serialized draft batch; rows past `expires_at` are
/// treated as absent by the repository.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stage1CacheEntry {
    pub id: DbId,
    pub style_pack_id: DbId,
    pub brief_hash: String,
    pub size_category_id: DbId,
    pub payload: serde_json::Value,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
