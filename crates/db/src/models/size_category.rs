//! Size category entity: tier structure, serving range, price band.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fondant_core::types::{DbId, Timestamp};

/// A row from the `size_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SizeCategory {
    pub id: DbId,
    pub name: String,
    pub tier_count: i16,
    pub serves_min: i32,
    pub serves_max: i32,
    pub price_min_cents: i64,
    pub price_max_cents: i64,
    pub default_shape: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a size category (admin curation).
#[derive(Debug, Deserialize)]
pub struct CreateSizeCategory {
    pub name: String,
    pub tier_count: i16,
    pub serves_min: i32,
    pub serves_max: i32,
    pub price_min_cents: i64,
    pub price_max_cents: i64,
    pub default_shape: Option<String>,
}
