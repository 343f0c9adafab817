//! Color-space conversions and perceptual distance.
//!
//! Two independent perceptual pipelines are implemented. Delta-E
//! comparisons (palette lock, palette-fit scoring) use CIE Lab with the
//! ΔE76 formula; consistency scoring uses OKLab for better perceptual
//! uniformity. Everything here is pure math with no I/O.

use serde::Serialize;

use crate::error::CoreError;
use crate::style::PaletteColor;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Maximum ΔE76 between a requested color and its nearest locked-palette
/// entry before the request counts as a palette-lock violation.
pub const PALETTE_LOCK_THRESHOLD: f64 = 10.0;

/// Looser ΔE76 ceiling used by the compatibility checker: past this the
/// requested color is considered structurally incompatible with the pack,
/// not merely off-palette.
pub const PALETTE_EXPLORATORY_THRESHOLD: f64 = 50.0;

/// Palette-lock strength at or above which prompts demand exact colors only.
pub const STRICT_LOCK_MIN: f64 = 0.9;

// ---------------------------------------------------------------------------
// Color types
// ---------------------------------------------------------------------------

/// An sRGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// A CIE Lab color (D65 illuminant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// An OKLab color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a 3- or 6-digit hex color, with or without a leading `#`,
/// case-insensitive.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, CoreError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidColorFormat(hex.to_string()));
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(CoreError::InvalidColorFormat(hex.to_string())),
    };
    let channel = |range: std::ops::Range<usize>| -> Result<f64, CoreError> {
        u8::from_str_radix(&expanded[range], 16)
            .map(|v| v as f64 / 255.0)
            .map_err(|_| CoreError::InvalidColorFormat(hex.to_string()))
    };
    Ok(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// sRGB gamma decode to linear light.
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Convert sRGB to CIE Lab via linear RGB and XYZ (D65).
pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    let r = srgb_to_linear(rgb.r);
    let g = srgb_to_linear(rgb.g);
    let b = srgb_to_linear(rgb.b);

    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    // D65 reference white.
    let fx = lab_f(x / 0.95047);
    let fy = lab_f(y / 1.0);
    let fz = lab_f(z / 1.08883);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert sRGB to OKLab.
pub fn rgb_to_oklab(rgb: Rgb) -> OkLab {
    let r = srgb_to_linear(rgb.r);
    let g = srgb_to_linear(rgb.g);
    let b = srgb_to_linear(rgb.b);

    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    let l_ = l.cbrt();
    let m_ = m.cbrt();
    let s_ = s.cbrt();

    OkLab {
        l: 0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_,
        a: 1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_,
        b: 0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_,
    }
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// ΔE76: Euclidean distance in CIE Lab.
///
/// Rough semantics: < 1 imperceptible, 1-2 perceptible on close inspection,
/// 2-10 perceptible at a glance, 11-49 increasingly dissimilar, >= 50
/// near-opposite colors.
pub fn delta_e76(a: Lab, b: Lab) -> f64 {
    ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
}

/// ΔE76 between two hex colors.
pub fn delta_e76_hex(a: &str, b: &str) -> Result<f64, CoreError> {
    Ok(delta_e76(rgb_to_lab(hex_to_rgb(a)?), rgb_to_lab(hex_to_rgb(b)?)))
}

// ---------------------------------------------------------------------------
// Palette lock
// ---------------------------------------------------------------------------

/// One requested color that landed outside the locked palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteViolation {
    pub requested: String,
    /// The locked-palette hex nearest to the requested color. Substituting
    /// this back into the brief is how auto-correction works.
    pub closest_match: String,
    pub delta_e: f64,
}

/// Verdict of a palette-lock validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteLockReport {
    pub valid: bool,
    pub violations: Vec<PaletteViolation>,
}

/// Check each requested color against the locked palette.
///
/// A violation is recorded when the minimum ΔE76 to any locked entry
/// exceeds [`PALETTE_LOCK_THRESHOLD`]. An empty locked palette constrains
/// nothing, so every request passes.
pub fn validate_palette_lock(
    requested: &[String],
    locked: &[PaletteColor],
) -> Result<PaletteLockReport, CoreError> {
    if locked.is_empty() {
        return Ok(PaletteLockReport {
            valid: true,
            violations: Vec::new(),
        });
    }

    let locked_labs: Vec<(&str, Lab)> = locked
        .iter()
        .map(|c| Ok((c.hex.as_str(), rgb_to_lab(hex_to_rgb(&c.hex)?))))
        .collect::<Result<_, CoreError>>()?;

    let mut violations = Vec::new();
    for hex in requested {
        let lab = rgb_to_lab(hex_to_rgb(hex)?);
        let mut closest: Option<(&str, f64)> = None;
        for (locked_hex, locked_lab) in &locked_labs {
            let delta = delta_e76(lab, *locked_lab);
            if closest.map_or(true, |(_, best)| delta < best) {
                closest = Some((locked_hex, delta));
            }
        }
        if let Some((closest_hex, delta)) = closest {
            if delta > PALETTE_LOCK_THRESHOLD {
                violations.push(PaletteViolation {
                    requested: hex.clone(),
                    closest_match: closest_hex.to_string(),
                    delta_e: delta,
                });
            }
        }
    }

    Ok(PaletteLockReport {
        valid: violations.is_empty(),
        violations,
    })
}

// ---------------------------------------------------------------------------
// Color-name lexicon
// ---------------------------------------------------------------------------

/// English color names recognized in customer briefs, with their canonical
/// hex values. Extraction iterates this list in order, so discovery order
/// is lexicon order, not text order.
pub const COLOR_LEXICON: &[(&str, &str)] = &[
    ("red", "#FF0000"),
    ("blue", "#0000FF"),
    ("gold", "#FFD700"),
    ("navy", "#000080"),
    ("pink", "#FFC0CB"),
    ("white", "#FFFFFF"),
    ("black", "#000000"),
    ("green", "#008000"),
    ("yellow", "#FFFF00"),
    ("purple", "#800080"),
    ("orange", "#FFA500"),
    ("silver", "#C0C0C0"),
    ("ivory", "#FFFFF0"),
    ("cream", "#FFFDD0"),
    ("lavender", "#E6E6FA"),
    ("mint", "#98FF98"),
    ("peach", "#FFE5B4"),
    ("burgundy", "#800020"),
    ("teal", "#008080"),
    ("coral", "#FF7F50"),
];

/// Extract hex values for every lexicon color name mentioned in the text.
///
/// Matching is case-insensitive substring containment.
pub fn extract_colors_from_text(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    COLOR_LEXICON
        .iter()
        .filter(|(name, _)| lower.contains(name))
        .map(|(_, hex)| *hex)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn palette(hexes: &[&str]) -> Vec<PaletteColor> {
        hexes
            .iter()
            .map(|h| PaletteColor {
                hex: h.to_string(),
                ratio: 1.0 / hexes.len() as f64,
            })
            .collect()
    }

    // -- hex_to_rgb -----------------------------------------------------------

    #[test]
    fn parses_six_digit_hex() {
        let rgb = hex_to_rgb("#FF8000").unwrap();
        assert!((rgb.r - 1.0).abs() < 1e-9);
        assert!((rgb.g - 128.0 / 255.0).abs() < 1e-9);
        assert!((rgb.b - 0.0).abs() < 1e-9);
    }

    #[test]
    fn parses_three_digit_hex() {
        let rgb = hex_to_rgb("#F80").unwrap();
        assert!((rgb.r - 1.0).abs() < 1e-9);
        assert!((rgb.g - 136.0 / 255.0).abs() < 1e-9);
        assert!((rgb.b - 0.0).abs() < 1e-9);
    }

    #[test]
    fn hash_prefix_optional_and_case_insensitive() {
        assert_eq!(hex_to_rgb("ffffff").unwrap(), hex_to_rgb("#FFFFFF").unwrap());
        assert_eq!(hex_to_rgb("#AbCdEf").unwrap(), hex_to_rgb("#ABCDEF").unwrap());
    }

    #[test]
    fn malformed_hex_rejected() {
        assert_matches!(hex_to_rgb(""), Err(CoreError::InvalidColorFormat(_)));
        assert_matches!(hex_to_rgb("#FFFF"), Err(CoreError::InvalidColorFormat(_)));
        assert_matches!(hex_to_rgb("#GGGGGG"), Err(CoreError::InvalidColorFormat(_)));
        assert_matches!(hex_to_rgb("not a color"), Err(CoreError::InvalidColorFormat(_)));
    }

    // -- conversions ----------------------------------------------------------

    #[test]
    fn black_is_lab_origin() {
        let lab = rgb_to_lab(hex_to_rgb("#000000").unwrap());
        assert!(lab.l.abs() < 1e-9);
        assert!(lab.a.abs() < 1e-9);
        assert!(lab.b.abs() < 1e-9);
    }

    #[test]
    fn white_is_lab_l100() {
        let lab = rgb_to_lab(hex_to_rgb("#FFFFFF").unwrap());
        assert!((lab.l - 100.0).abs() < 0.01);
        assert!(lab.a.abs() < 0.5);
        assert!(lab.b.abs() < 0.5);
    }

    #[test]
    fn white_is_oklab_l1() {
        let ok = rgb_to_oklab(hex_to_rgb("#FFFFFF").unwrap());
        assert!((ok.l - 1.0).abs() < 1e-6);
        assert!(ok.a.abs() < 1e-6);
        assert!(ok.b.abs() < 1e-6);
    }

    // -- delta_e76 ------------------------------------------------------------

    #[test]
    fn delta_e_identity() {
        let lab = rgb_to_lab(hex_to_rgb("#FF7F50").unwrap());
        assert!(delta_e76(lab, lab) < 1e-9);
    }

    #[test]
    fn delta_e_symmetry() {
        let a = rgb_to_lab(hex_to_rgb("#FFD700").unwrap());
        let b = rgb_to_lab(hex_to_rgb("#000080").unwrap());
        assert!((delta_e76(a, b) - delta_e76(b, a)).abs() < 1e-9);
    }

    #[test]
    fn near_identical_colors_are_close() {
        let delta = delta_e76_hex("#FFFFFF", "#FEFEFE").unwrap();
        assert!(delta < 1.0, "expected imperceptible delta, got {delta}");
    }

    #[test]
    fn opposite_colors_are_far() {
        let delta = delta_e76_hex("#FFFFFF", "#000000").unwrap();
        assert!(delta > 50.0, "expected near-opposite delta, got {delta}");
    }

    // -- validate_palette_lock ------------------------------------------------

    #[test]
    fn near_match_passes_lock() {
        let report =
            validate_palette_lock(&["#FEFEFE".to_string()], &palette(&["#FFFFFF"])).unwrap();
        assert!(report.valid);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn distant_color_violates_lock() {
        let report =
            validate_palette_lock(&["#000000".to_string()], &palette(&["#FFFFFF"])).unwrap();
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.requested, "#000000");
        assert_eq!(violation.closest_match, "#FFFFFF");
        assert!(violation.delta_e > 50.0);
    }

    #[test]
    fn closest_match_is_the_nearest_entry() {
        let report = validate_palette_lock(
            &["#FF1010".to_string()],
            &palette(&["#0000FF", "#FF0000", "#FFFFFF"]),
        )
        .unwrap();
        // Near-red is within the lock threshold of #FF0000.
        assert!(report.valid);

        let report = validate_palette_lock(
            &["#00FF00".to_string()],
            &palette(&["#0000FF", "#FF0000"]),
        )
        .unwrap();
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn empty_locked_palette_passes_everything() {
        let report = validate_palette_lock(&["#123456".to_string()], &[]).unwrap();
        assert!(report.valid);
    }

    #[test]
    fn malformed_requested_color_errors() {
        let result = validate_palette_lock(&["bogus".to_string()], &palette(&["#FFFFFF"]));
        assert_matches!(result, Err(CoreError::InvalidColorFormat(_)));
    }

    // -- extract_colors_from_text ---------------------------------------------

    #[test]
    fn extracts_in_lexicon_order() {
        let colors = extract_colors_from_text("Pink roses with GOLD accents");
        assert_eq!(colors, vec!["#FFD700", "#FFC0CB"]);
    }

    #[test]
    fn extraction_is_substring_based() {
        // "layered" contains "red"; containment is intentional and pinned.
        let colors = extract_colors_from_text("a layered cake");
        assert_eq!(colors, vec!["#FF0000"]);
    }

    #[test]
    fn no_colors_mentioned() {
        assert!(extract_colors_from_text("three tiers of sponge").is_empty());
    }
}
