//! Decoration density classification.
//!
//! Reference images and customer briefs are bucketed into a coarse
//! three-level density scale. The scale is ordinal: `Low < Mid < High`,
//! and the IDs match the `decoration_densities` seed data (1-based).

use serde::{Deserialize, Serialize};

/// Keywords that indicate a sparse, understated design.
const LOW_KEYWORDS: &[&str] = &["minimal", "simple", "clean", "understated", "plain"];

/// Keywords that indicate a heavily decorated design.
const HIGH_KEYWORDS: &[&str] = &[
    "elaborate",
    "detailed",
    "intricate",
    "ornate",
    "lavish",
    "extravagant",
];

/// Decoration density level for a reference image or a customer brief.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Low = 1,
    Mid = 2,
    High = 3,
}

impl Density {
    /// Return the database density ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Look up a density by its database ID.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Low),
            2 => Some(Self::Mid),
            3 => Some(Self::High),
            _ => None,
        }
    }

    /// Lowercase label matching the seed data.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }

    /// Parse a lowercase label back into a density.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "low" => Some(Self::Low),
            "mid" => Some(Self::Mid),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Infer a coarse density from free text via keyword buckets.
///
/// The low bucket is checked before the high bucket, so text containing
/// keywords from both buckets resolves to `Low`. Text matching neither
/// bucket defaults to `Mid`.
pub fn infer_from_text(text: &str) -> Density {
    let lower = text.to_lowercase();
    if LOW_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Density::Low
    } else if HIGH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Density::High
    } else {
        Density::Mid
    }
}

/// Average a set of densities to the nearest level.
///
/// Used to collapse a style pack's reference images into a single
/// representative density. An empty slice averages to `Mid`.
pub fn average(densities: &[Density]) -> Density {
    if densities.is_empty() {
        return Density::Mid;
    }
    let sum: i64 = densities.iter().map(|d| d.id() as i64).sum();
    let mean = (sum as f64 / densities.len() as f64).round() as i16;
    Density::from_id(mean.clamp(1, 3)).unwrap_or(Density::Mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- infer_from_text ------------------------------------------------------

    #[test]
    fn low_keywords_infer_low() {
        assert_eq!(infer_from_text("a simple white cake"), Density::Low);
        assert_eq!(infer_from_text("MINIMAL decorations please"), Density::Low);
    }

    #[test]
    fn high_keywords_infer_high() {
        assert_eq!(infer_from_text("ornate gold details"), Density::High);
        assert_eq!(infer_from_text("very Elaborate piping"), Density::High);
    }

    #[test]
    fn no_keywords_infer_mid() {
        assert_eq!(infer_from_text("pink roses for a birthday"), Density::Mid);
    }

    #[test]
    fn low_bucket_wins_over_high() {
        assert_eq!(
            infer_from_text("simple but with intricate sugar work"),
            Density::Low
        );
    }

    // -- average --------------------------------------------------------------

    #[test]
    fn average_empty_is_mid() {
        assert_eq!(average(&[]), Density::Mid);
    }

    #[test]
    fn average_rounds_to_nearest() {
        assert_eq!(average(&[Density::Low, Density::High]), Density::Mid);
        assert_eq!(
            average(&[Density::High, Density::High, Density::Mid]),
            Density::High
        );
        assert_eq!(average(&[Density::Low, Density::Low]), Density::Low);
    }

    // -- id / label round trips -----------------------------------------------

    #[test]
    fn id_round_trip() {
        for d in [Density::Low, Density::Mid, Density::High] {
            assert_eq!(Density::from_id(d.id()), Some(d));
        }
        assert_eq!(Density::from_id(0), None);
        assert_eq!(Density::from_id(4), None);
    }

    #[test]
    fn label_round_trip() {
        for d in [Density::Low, Density::Mid, Density::High] {
            assert_eq!(Density::from_label(d.label()), Some(d));
        }
        assert_eq!(Density::from_label("medium"), None);
    }
}
