//! Reference image entity: a curated photo backing a style pack.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fondant_core::density::Density;
use fondant_core::style::ReferenceSummary;
use fondant_core::types::{DbId, Timestamp};

/// A row from the `reference_images` table.
///
/// `palette`, `texture_tags`, `density_id` and `embedding` are populated by
/// vision analysis. A row with `analyzed_at` NULL is an uploaded image that
/// has not been analyzed yet.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReferenceImage {
    pub id: DbId,
    pub style_pack_id: DbId,
    pub storage_key: String,
    pub palette: serde_json::Value,
    pub texture_tags: Vec<String>,
    pub density_id: i16,
    pub embedding: Option<Vec<f32>>,
    pub analyzed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ReferenceImage {
    /// Whether vision analysis has populated this row.
    pub fn is_analyzed(&self) -> bool {
        self.analyzed_at.is_some()
    }

    /// Condensed per-image summary used when assembling a style profile.
    pub fn summary(&self) -> Result<ReferenceSummary, serde_json::Error> {
        Ok(ReferenceSummary {
            palette: serde_json::from_value(self.palette.clone())?,
            texture_tags: self.texture_tags.clone(),
            density: Density::from_id(self.density_id).unwrap_or(Density::Mid),
            embedding: self.embedding.clone(),
        })
    }
}

/// DTO for registering an uploaded image before analysis.
#[derive(Debug, Deserialize)]
pub struct CreateReferenceImage {
    pub style_pack_id: DbId,
    pub storage_key: String,
}

/// Analysis results written back onto an uploaded image.
#[derive(Debug, Clone)]
pub struct ReferenceAnalysis {
    pub palette: serde_json::Value,
    pub texture_tags: Vec<String>,
    pub density_id: i16,
    pub embedding: Option<Vec<f32>>,
}
