//! Shared style-pack value types.
//!
//! These are the in-memory shapes the compatibility checker, prompt
//! synthesizer, and quality evaluator all operate on. The repository layer
//! maps database rows (including the JSONB palette columns) into these.

use serde::{Deserialize, Serialize};

use crate::density::{self, Density};
use crate::error::CoreError;

/// One color of a locked or extracted palette.
///
/// `ratio` is the mixing proportion in `[0, 1]`; a palette's ratios are
/// expected (not enforced) to sum to roughly 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub hex: String,
    pub ratio: f64,
}

/// Style-intensity knobs, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleIntensity {
    pub style_strength: f64,
    pub sharpness: f64,
    pub realism: f64,
    pub complexity: f64,
    pub uniformity: f64,
}

impl StyleIntensity {
    /// Validate that every knob is in `[0, 1]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let knobs = [
            ("style_strength", self.style_strength),
            ("sharpness", self.sharpness),
            ("realism", self.realism),
            ("complexity", self.complexity),
            ("uniformity", self.uniformity),
        ];
        for (name, value) in knobs {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StyleIntensity {
    fn default() -> Self {
        Self {
            style_strength: 0.7,
            sharpness: 0.5,
            realism: 0.5,
            complexity: 0.5,
            uniformity: 0.5,
        }
    }
}

/// Analysis output for one reference image of a style pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub palette: Vec<PaletteColor>,
    pub texture_tags: Vec<String>,
    pub density: Density,
    /// Embedding vector used for similarity checks; absent until computed.
    pub embedding: Option<Vec<f32>>,
}

/// A style pack as the pipeline sees it: locked constraints plus the
/// analyzed reference images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleProfile {
    pub palette: Vec<PaletteColor>,
    pub allowed_decorations: Vec<String>,
    pub banned_terms: Vec<String>,
    /// Palette-lock strength in `[0, 1]`; >= 0.9 means exact colors only.
    pub palette_lock_strength: f64,
    pub intensity: StyleIntensity,
    pub shape_template: Option<String>,
    pub trend_keywords: Vec<String>,
    pub trend_techniques: Vec<String>,
    pub references: Vec<ReferenceSummary>,
}

impl StyleProfile {
    /// Densities of all reference images, in storage order.
    pub fn reference_densities(&self) -> Vec<Density> {
        self.references.iter().map(|r| r.density).collect()
    }

    /// The pack's representative density (rounded mean over references).
    pub fn average_reference_density(&self) -> Density {
        density::average(&self.reference_densities())
    }

    /// Texture tags across all references, deduplicated in first-seen order.
    pub fn reference_texture_tags(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for reference in &self.references {
            for tag in &reference.texture_tags {
                if !seen.contains(&tag.as_str()) {
                    seen.push(tag);
                }
            }
        }
        seen
    }
}

/// What the customer asked for, after request-level validation.
#[derive(Debug, Clone, Default)]
pub struct CustomerIntent {
    /// Free-text brief; empty string when the customer left it blank.
    pub text: String,
    /// Explicitly requested hex colors, if the order form collected any.
    pub requested_colors: Vec<String>,
    /// Embeddings of customer-supplied inspiration images, if any.
    pub inspiration_embeddings: Vec<Vec<f32>>,
}
