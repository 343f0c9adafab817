//! Proposal entity: one generated cake design for a request.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fondant_core::quality::QualityScores;
use fondant_core::types::{DbId, Timestamp};

/// A row from the `proposals` table.
///
/// `stage` is 1 for draft proposals and 2 for refined ones; `scores` holds
/// the per-axis quality scores as JSONB.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub request_id: DbId,
    pub variant_id: i16,
    pub image_key: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    pub stage: i16,
    pub scores: serde_json::Value,
    pub rank_score: f64,
    pub price_min_cents: i64,
    pub price_max_cents: i64,
    pub badges: Vec<String>,
    pub is_selected: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Proposal {
    /// Typed view of the JSONB scores column.
    pub fn quality_scores(&self) -> Result<QualityScores, serde_json::Error> {
        serde_json::from_value(self.scores.clone())
    }
}

/// DTO for inserting one proposal; batches go through
/// `ProposalRepo::create_batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProposal {
    pub request_id: DbId,
    pub variant_id: i16,
    pub image_key: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    pub stage: i16,
    pub scores: serde_json::Value,
    pub rank_score: f64,
    pub price_min_cents: i64,
    pub price_max_cents: i64,
    pub badges: Vec<String>,
}
