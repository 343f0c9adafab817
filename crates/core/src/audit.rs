//! Audit logging constants and utility functions.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the pipeline orchestrator.

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit log entries.
pub mod action_types {
    pub const FORBIDDEN_TERM_REPLACEMENT: &str = "forbidden_term_replacement";
    pub const PALETTE_LOCK_VIOLATION: &str = "palette_lock_violation";
    pub const COMPATIBILITY_CONFLICT: &str = "compatibility_conflict";
    pub const LOW_QUALITY_FLAGGED: &str = "low_quality_flagged";
    pub const GENERATION_STARTED: &str = "generation_started";
    pub const GENERATION_COMPLETED: &str = "generation_completed";
    pub const GENERATION_FAILED: &str = "generation_failed";
    pub const PROPOSAL_SELECTED: &str = "proposal_selected";
}

// ---------------------------------------------------------------------------
// Log category constants
// ---------------------------------------------------------------------------

/// Known log categories for retention and filtering.
pub mod log_categories {
    pub const CONSTRAINT: &str = "constraint";
    pub const QUALITY: &str = "quality";
    pub const LIFECYCLE: &str = "lifecycle";
}

// ---------------------------------------------------------------------------
// Action-to-category mapping
// ---------------------------------------------------------------------------

/// Map an action type to its log category.
///
/// Unknown action types default to `"lifecycle"`.
pub fn action_to_category(action_type: &str) -> &'static str {
    match action_type {
        action_types::FORBIDDEN_TERM_REPLACEMENT
        | action_types::PALETTE_LOCK_VIOLATION
        | action_types::COMPATIBILITY_CONFLICT => log_categories::CONSTRAINT,
        action_types::LOW_QUALITY_FLAGGED => log_categories::QUALITY,
        _ => log_categories::LIFECYCLE,
    }
}
