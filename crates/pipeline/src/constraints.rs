//! Constraint build: forbidden-term filtering, palette-lock validation,
//! and the tier layout grounding for the prompt synthesizer.

use fondant_core::audit::action_types;
use fondant_core::color;
use fondant_core::forbidden;
use fondant_core::style::StyleProfile;
use fondant_core::tiers;
use fondant_core::types::DbId;
use fondant_db::models::audit_log::CreateAuditLog;
use rand::Rng;
use serde_json::json;

use crate::error::PipelineError;

/// Hard inputs the prompt synthesizer must honor, plus the audit entries
/// the build produced along the way.
#[derive(Debug)]
pub struct ConstraintBundle {
    /// Customer brief after forbidden-term filtering. `None` when the
    /// customer left it blank.
    pub brief: Option<String>,
    /// Physical tier layout the image must depict.
    pub layout_description: String,
    /// Audit entries for every replacement and palette violation. The
    /// caller persists these in one batch.
    pub audits: Vec<CreateAuditLog>,
}

/// Build the constraint bundle for one run.
///
/// Scrubs forbidden terms out of the brief, then checks any color words in
/// the cleaned text against the locked palette. Violations never abort the
/// run; the strict palette directive in the prompt overrides stray colors,
/// and the audit trail records what the customer asked for.
pub fn build<R: Rng + ?Sized>(
    request_id: DbId,
    style: &StyleProfile,
    brief: Option<&str>,
    tier_count: i16,
    shape: &str,
    rng: &mut R,
) -> Result<ConstraintBundle, PipelineError> {
    let mut audits = Vec::new();

    let brief = match brief.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => {
            let outcome = forbidden::filter(text, rng);
            for replacement in &outcome.replacements {
                tracing::info!(
                    request_id,
                    original = %replacement.original,
                    replacement = %replacement.replacement,
                    "Replaced forbidden term in customer brief"
                );
                audits.push(CreateAuditLog {
                    request_id: Some(request_id),
                    action_type: action_types::FORBIDDEN_TERM_REPLACEMENT.into(),
                    details: json!({
                        "original": replacement.original,
                        "replacement": replacement.replacement,
                        "offset": replacement.offset,
                    }),
                });
            }
            for warning in &outcome.warnings {
                tracing::warn!(request_id, warning, "Forbidden-term filter warning");
            }
            Some(outcome.cleaned_text)
        }
        None => None,
    };

    if let Some(text) = &brief {
        let requested: Vec<String> = color::extract_colors_from_text(text)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !requested.is_empty() && !style.palette.is_empty() {
            let report = color::validate_palette_lock(&requested, &style.palette)
                .map_err(|e| PipelineError::MalformedPalette(e.to_string()))?;
            for violation in &report.violations {
                tracing::warn!(
                    request_id,
                    requested = %violation.requested,
                    closest_match = %violation.closest_match,
                    delta_e = violation.delta_e,
                    "Requested color falls outside the locked palette"
                );
                audits.push(CreateAuditLog {
                    request_id: Some(request_id),
                    action_type: action_types::PALETTE_LOCK_VIOLATION.into(),
                    details: json!({
                        "requested": violation.requested,
                        "closest_match": violation.closest_match,
                        "delta_e": violation.delta_e,
                    }),
                });
            }
        }
    }

    Ok(ConstraintBundle {
        brief,
        layout_description: tiers::layout_mask_description(tier_count, shape),
        audits,
    })
}
