//! Content addressing for Stage-1 generation results.
//!
//! Cache keys are derived from content, not request identity, so two
//! unrelated requests sharing a style pack, size category, and
//! semantically identical brief text reuse the same expensive Stage-1
//! output.

use crate::hashing;
use crate::types::DbId;

/// How long a cached Stage-1 result stays valid.
pub const STAGE1_CACHE_TTL_HOURS: i64 = 24;

/// Normalize a brief for hashing: trim surrounding whitespace, lowercase.
pub fn normalize_brief(text: &str) -> String {
    text.trim().to_lowercase()
}

/// SHA-256 hex digest of the normalized brief.
pub fn hash_brief(text: &str) -> String {
    hashing::sha256_hex(normalize_brief(text).as_bytes())
}

/// The composite cache key for one Stage-1 result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stage1Key {
    pub style_pack_id: DbId,
    pub brief_hash: String,
    pub size_category_id: DbId,
}

impl Stage1Key {
    pub fn new(style_pack_id: DbId, brief: &str, size_category_id: DbId) -> Self {
        Self {
            style_pack_id,
            brief_hash: hash_brief(brief),
            size_category_id,
        }
    }
}
