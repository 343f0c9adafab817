//! Style pack entity and its mapping into the core domain types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fondant_core::style::{PaletteColor, StyleIntensity, StyleProfile};
use fondant_core::types::{DbId, Timestamp};

use super::reference_image::ReferenceImage;

/// A row from the `style_packs` table.
///
/// The palette is stored as JSONB; use [`StylePack::palette_colors`] for
/// the typed view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StylePack {
    pub id: DbId,
    pub name: String,
    pub version: i32,
    pub palette: serde_json::Value,
    pub allowed_decorations: Vec<String>,
    pub banned_terms: Vec<String>,
    pub palette_lock_strength: f64,
    pub style_strength: f64,
    pub sharpness: f64,
    pub realism: f64,
    pub complexity: f64,
    pub uniformity: f64,
    pub shape_template: Option<String>,
    pub trend_keywords: Vec<String>,
    pub trend_techniques: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StylePack {
    /// Typed view of the JSONB palette column.
    pub fn palette_colors(&self) -> Result<Vec<PaletteColor>, serde_json::Error> {
        serde_json::from_value(self.palette.clone())
    }

    /// The pack's style-intensity knobs as one value.
    pub fn intensity(&self) -> StyleIntensity {
        StyleIntensity {
            style_strength: self.style_strength,
            sharpness: self.sharpness,
            realism: self.realism,
            complexity: self.complexity,
            uniformity: self.uniformity,
        }
    }

    /// Assemble the domain profile the pipeline components consume.
    ///
    /// Fails when the pack's or any reference's palette JSONB does not
    /// deserialize into `{hex, ratio}` objects.
    pub fn to_style_profile(
        &self,
        references: &[ReferenceImage],
    ) -> Result<StyleProfile, serde_json::Error> {
        let summaries = references
            .iter()
            .map(|reference| reference.summary())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StyleProfile {
            palette: self.palette_colors()?,
            allowed_decorations: self.allowed_decorations.clone(),
            banned_terms: self.banned_terms.clone(),
            palette_lock_strength: self.palette_lock_strength,
            intensity: self.intensity(),
            shape_template: self.shape_template.clone(),
            trend_keywords: self.trend_keywords.clone(),
            trend_techniques: self.trend_techniques.clone(),
            references: summaries,
        })
    }
}

/// DTO for creating a style pack (admin curation).
#[derive(Debug, Deserialize)]
pub struct CreateStylePack {
    pub name: String,
    pub palette: serde_json::Value,
    pub allowed_decorations: Vec<String>,
    pub banned_terms: Vec<String>,
    pub palette_lock_strength: f64,
    pub intensity: StyleIntensity,
    pub shape_template: Option<String>,
    pub trend_keywords: Vec<String>,
    pub trend_techniques: Vec<String>,
}
