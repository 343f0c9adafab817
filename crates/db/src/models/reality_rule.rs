//! Reality rule lookup: physical constraints appended to every prompt.

use serde::Serialize;
use sqlx::FromRow;

use fondant_core::types::{DbId, Timestamp};

/// A row from the `reality_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RealityRule {
    pub id: DbId,
    pub rule_text: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}
