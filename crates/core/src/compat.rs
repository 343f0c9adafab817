//! Pre-generation compatibility checking.
//!
//! Detects structural conflicts between a customer's stated intent and a
//! style pack's locked constraints before any generation budget is spent.
//! Incompatibility is advisory: the orchestrator logs conflicts and
//! proceeds, it never refuses to generate because of them.

use serde::Serialize;

use crate::color::{self, PALETTE_EXPLORATORY_THRESHOLD};
use crate::density::{self, Density};
use crate::style::{CustomerIntent, StyleProfile};

// ---------------------------------------------------------------------------
// Confidence penalties
// ---------------------------------------------------------------------------

/// Confidence deduction per high-severity conflict.
pub const CONFIDENCE_PENALTY_HIGH: f64 = 0.30;
/// Confidence deduction per medium-severity conflict.
pub const CONFIDENCE_PENALTY_MEDIUM: f64 = 0.15;
/// Confidence deduction per low-severity conflict.
pub const CONFIDENCE_PENALTY_LOW: f64 = 0.05;

/// Cosine similarity below which inspiration images are flagged as
/// stylistically unrelated to the pack's references.
pub const TECHNIQUE_SIMILARITY_FLOOR: f64 = 0.3;

// ---------------------------------------------------------------------------
// Conflict types
// ---------------------------------------------------------------------------

/// Which check produced a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Palette,
    Keyword,
    Density,
    Technique,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Palette => "palette",
            Self::Keyword => "keyword",
            Self::Density => "density",
            Self::Technique => "technique",
        }
    }
}

/// Conflict severity, ordered so severities can be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    fn confidence_penalty(self) -> f64 {
        match self {
            Self::Low => CONFIDENCE_PENALTY_LOW,
            Self::Medium => CONFIDENCE_PENALTY_MEDIUM,
            Self::High => CONFIDENCE_PENALTY_HIGH,
        }
    }
}

/// One detected conflict between intent and pack constraints.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub message: String,
    /// Concrete alternatives the customer-facing surface may offer.
    pub suggestions: Vec<String>,
}

/// The checker's verdict.
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    /// True iff every conflict (if any) is low severity.
    pub compatible: bool,
    /// Starts at 1.0, reduced per conflict by severity, floored at 0.
    pub confidence: f64,
    pub conflicts: Vec<Conflict>,
}

// ---------------------------------------------------------------------------
// Cosine similarity
// ---------------------------------------------------------------------------

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Returns `0.0` if vectors have
/// different lengths, are empty, or either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// Severity of a density mismatch between intent and references.
///
/// Opposite ends of the scale (low vs high) are a high-severity conflict,
/// adjacent levels a medium one, identical levels none.
pub fn density_mismatch_severity(a: Density, b: Density) -> Option<Severity> {
    match (a.id() - b.id()).abs() {
        0 => None,
        1 => Some(Severity::Medium),
        _ => Some(Severity::High),
    }
}

fn check_palette(style: &StyleProfile, intent: &CustomerIntent, conflicts: &mut Vec<Conflict>) {
    if style.palette.is_empty() {
        return;
    }

    let mut requested: Vec<String> = intent.requested_colors.clone();
    for hex in color::extract_colors_from_text(&intent.text) {
        if !requested.iter().any(|r| r.eq_ignore_ascii_case(hex)) {
            requested.push(hex.to_string());
        }
    }

    for hex in requested {
        let Ok(rgb) = color::hex_to_rgb(&hex) else {
            // Unparseable explicit colors are rejected at request creation;
            // skip rather than fail the whole advisory check.
            continue;
        };
        let lab = color::rgb_to_lab(rgb);

        let mut distances: Vec<(f64, &str)> = style
            .palette
            .iter()
            .filter_map(|locked| {
                let locked_rgb = color::hex_to_rgb(&locked.hex).ok()?;
                Some((
                    color::delta_e76(lab, color::rgb_to_lab(locked_rgb)),
                    locked.hex.as_str(),
                ))
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        match distances.first() {
            Some((nearest, _)) if *nearest > PALETTE_EXPLORATORY_THRESHOLD => {
                conflicts.push(Conflict {
                    kind: ConflictKind::Palette,
                    severity: Severity::High,
                    message: format!(
                        "Requested color {hex} is nowhere near the locked palette \
                         (nearest delta E {nearest:.1})"
                    ),
                    suggestions: distances
                        .iter()
                        .take(3)
                        .map(|(_, locked_hex)| locked_hex.to_string())
                        .collect(),
                });
            }
            _ => {}
        }
    }
}

fn check_keywords(style: &StyleProfile, intent: &CustomerIntent, conflicts: &mut Vec<Conflict>) {
    let lower = intent.text.to_lowercase();
    for banned in &style.banned_terms {
        if !banned.is_empty() && lower.contains(&banned.to_lowercase()) {
            conflicts.push(Conflict {
                kind: ConflictKind::Keyword,
                severity: Severity::High,
                message: format!("Brief mentions \"{banned}\", which this style pack bans"),
                suggestions: Vec::new(),
            });
        }
    }
}

fn check_density(style: &StyleProfile, intent: &CustomerIntent, conflicts: &mut Vec<Conflict>) {
    if style.references.is_empty() {
        return;
    }
    let inferred = density::infer_from_text(&intent.text);
    let reference = style.average_reference_density();
    if let Some(severity) = density_mismatch_severity(inferred, reference) {
        conflicts.push(Conflict {
            kind: ConflictKind::Density,
            severity,
            message: format!(
                "Brief suggests {} decoration density but the pack's references average {}",
                inferred.label(),
                reference.label()
            ),
            suggestions: Vec::new(),
        });
    }
}

fn check_technique(style: &StyleProfile, intent: &CustomerIntent, conflicts: &mut Vec<Conflict>) {
    if intent.inspiration_embeddings.is_empty() {
        return;
    }
    let reference_embeddings: Vec<&Vec<f32>> = style
        .references
        .iter()
        .filter_map(|r| r.embedding.as_ref())
        .collect();
    if reference_embeddings.is_empty() {
        return;
    }

    let mut best = f64::MIN;
    for inspiration in &intent.inspiration_embeddings {
        for reference in &reference_embeddings {
            best = best.max(cosine_similarity(inspiration, reference));
        }
    }

    if best < TECHNIQUE_SIMILARITY_FLOOR {
        conflicts.push(Conflict {
            kind: ConflictKind::Technique,
            severity: Severity::Medium,
            message: format!(
                "Inspiration images look unrelated to the pack's reference style \
                 (best similarity {best:.2})"
            ),
            suggestions: Vec::new(),
        });
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run all four checks and fold the conflicts into a report.
pub fn check_compatibility(style: &StyleProfile, intent: &CustomerIntent) -> CompatibilityReport {
    let mut conflicts = Vec::new();
    check_palette(style, intent, &mut conflicts);
    check_keywords(style, intent, &mut conflicts);
    check_density(style, intent, &mut conflicts);
    check_technique(style, intent, &mut conflicts);

    let confidence = conflicts
        .iter()
        .fold(1.0_f64, |acc, c| acc - c.severity.confidence_penalty())
        .max(0.0);
    let compatible = conflicts.iter().all(|c| c.severity == Severity::Low);

    CompatibilityReport {
        compatible,
        confidence,
        conflicts,
    }
}
