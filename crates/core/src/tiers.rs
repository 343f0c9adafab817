//! Tier structure validation and layout grounding.

use crate::error::CoreError;

/// Smallest sellable cake structure.
pub const MIN_TIER_COUNT: i16 = 1;
/// Largest structure the bakery will attempt.
pub const MAX_TIER_COUNT: i16 = 6;

/// Validate a size category's tier count.
pub fn validate_tier_count(count: i16) -> Result<(), CoreError> {
    if (MIN_TIER_COUNT..=MAX_TIER_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "tier count must be between {MIN_TIER_COUNT} and {MAX_TIER_COUNT}, got {count}"
        )))
    }
}

/// Describe the tier layout in plain language.
///
/// The description is injected into prompts as visual grounding for the
/// generation model; it is informational, never parsed back.
pub fn layout_mask_description(tier_count: i16, shape: &str) -> String {
    match tier_count {
        n if n <= 1 => format!(
            "A single {shape} tier, centered, occupying the middle two thirds of the frame."
        ),
        n => {
            // Tier widths step down evenly from 100% at the base to 40% on top.
            let step = 60 / (n as i64 - 1).max(1);
            format!(
                "{n} stacked {shape} tiers, widest at the base, each upper tier \
                 about {step} percent narrower than the one below, vertically centered."
            )
        }
    }
}
