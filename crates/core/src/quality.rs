//! Quality scoring math for generated proposals.
//!
//! The four axis scores come from vision calls made by the pipeline crate;
//! everything here is the pure part: weights, fallbacks, rating parsing,
//! and the palette-fit / bakeability formulas.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Weights and fallbacks
// ---------------------------------------------------------------------------

/// Weight of the on-brief axis in the overall score.
pub const WEIGHT_ON_BRIEF: f64 = 0.30;
/// Weight of the palette-fit axis in the overall score.
pub const WEIGHT_PALETTE_FIT: f64 = 0.25;
/// Weight of the bakeability axis in the overall score.
pub const WEIGHT_BAKEABILITY: f64 = 0.25;
/// Weight of the aesthetic axis in the overall score.
pub const WEIGHT_AESTHETIC: f64 = 0.20;

/// Neutral on-brief score used when the vision call fails.
pub const DEFAULT_ON_BRIEF: f64 = 0.5;
/// Default palette-fit score used when color extraction fails.
pub const DEFAULT_PALETTE_FIT: f64 = 0.7;
/// Default bakeability score used when issue detection fails.
pub const DEFAULT_BAKEABILITY: f64 = 0.8;
/// Default aesthetic score used when the rating call fails.
pub const DEFAULT_AESTHETIC: f64 = 0.75;

/// Candidates whose overall score falls below this are flagged low quality.
pub const LOW_QUALITY_THRESHOLD: f64 = 0.4;

/// How much each feasibility issue subtracts per unit of severity.
pub const ISSUE_SEVERITY_WEIGHT: f64 = 0.3;

/// Minimum overall score for the high-quality badge.
pub const HIGH_QUALITY_BADGE_MIN: f64 = 0.8;

/// Badge label attached to proposals scoring at or above
/// [`HIGH_QUALITY_BADGE_MIN`].
pub const BADGE_HIGH_QUALITY: &str = "high-quality";

// ---------------------------------------------------------------------------
// Score bundle
// ---------------------------------------------------------------------------

/// Per-axis quality scores for one generated candidate, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub on_brief: f64,
    pub palette_fit: f64,
    pub bakeability: f64,
    pub aesthetic: f64,
}

impl QualityScores {
    /// The per-axis fallback bundle, used when every vision call fails.
    pub fn fallback() -> Self {
        Self {
            on_brief: DEFAULT_ON_BRIEF,
            palette_fit: DEFAULT_PALETTE_FIT,
            bakeability: DEFAULT_BAKEABILITY,
            aesthetic: DEFAULT_AESTHETIC,
        }
    }

    /// Weighted overall score; the weights sum to 1.0 so the result stays
    /// in `[0, 1]` whenever the axes do.
    pub fn overall(&self) -> f64 {
        WEIGHT_ON_BRIEF * self.on_brief
            + WEIGHT_PALETTE_FIT * self.palette_fit
            + WEIGHT_BAKEABILITY * self.bakeability
            + WEIGHT_AESTHETIC * self.aesthetic
    }

    /// Whether this candidate falls below the low-quality line.
    pub fn is_low_quality(&self) -> bool {
        self.overall() < LOW_QUALITY_THRESHOLD
    }

    /// Whether this candidate earns the high-quality badge.
    pub fn earns_high_quality_badge(&self) -> bool {
        self.overall() >= HIGH_QUALITY_BADGE_MIN
    }
}

// ---------------------------------------------------------------------------
// Rating parsing
// ---------------------------------------------------------------------------

/// Extract the first integer from free text and clamp it to `0..=100`.
///
/// Vision models answer rating prompts with anything from a bare `87` to
/// "I'd rate this 87 out of 100"; only the first run of digits counts.
pub fn parse_rating(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = text[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()?;

    let mut value: u32 = 0;
    for byte in digits.bytes() {
        value = value
            .saturating_mul(10)
            .saturating_add((byte - b'0') as u32);
    }
    Some(value.min(100))
}

// ---------------------------------------------------------------------------
// Axis formulas
// ---------------------------------------------------------------------------

/// Map an average ΔE76 between extracted and target palettes to `[0, 1]`.
///
/// An average ΔE of 10 or less is a perfect fit, 30 or more scores zero,
/// linear in between.
pub fn palette_fit_from_avg_delta(avg_delta: f64) -> f64 {
    (1.0 - (avg_delta - 10.0) / 20.0).clamp(0.0, 1.0)
}

/// Manufacturing-feasibility issue categories the vision capability is
/// asked to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityIssueKind {
    GravityViolation,
    NonEdibleTexture,
    LogoReplication,
    TextDistortion,
    UnrealisticStructure,
}

impl FeasibilityIssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GravityViolation => "gravity_violation",
            Self::NonEdibleTexture => "non_edible_texture",
            Self::LogoReplication => "logo_replication",
            Self::TextDistortion => "text_distortion",
            Self::UnrealisticStructure => "unrealistic_structure",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "gravity_violation" => Some(Self::GravityViolation),
            "non_edible_texture" => Some(Self::NonEdibleTexture),
            "logo_replication" => Some(Self::LogoReplication),
            "text_distortion" => Some(Self::TextDistortion),
            "unrealistic_structure" => Some(Self::UnrealisticStructure),
            _ => None,
        }
    }
}

/// One feasibility issue reported for a candidate image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityIssue {
    pub kind: FeasibilityIssueKind,
    /// Issue severity in `[0, 1]` as judged by the vision capability.
    pub severity: f64,
}

/// Fold feasibility issues into a bakeability score.
///
/// Starts at 1.0, subtracts `severity x 0.3` per issue, floors at 0.
pub fn bakeability_from_issues(issues: &[FeasibilityIssue]) -> f64 {
    issues
        .iter()
        .fold(1.0_f64, |acc, issue| {
            acc - issue.severity.clamp(0.0, 1.0) * ISSUE_SEVERITY_WEIGHT
        })
        .max(0.0)
}
