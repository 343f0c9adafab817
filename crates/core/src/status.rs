//! Request lifecycle status constants and state machine.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the pipeline orchestrator.

/// Request status IDs matching `request_statuses` seed data (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Proposals are being generated.
    Generating = 1,
    /// Proposals are ready for the customer to review.
    Ready = 2,
    /// Generation failed; the customer sees a retry-capable message.
    Failed = 3,
    /// The customer picked a proposal. Terminal.
    Selected = 4,
}

impl RequestStatus {
    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Generating),
            2 => Some(Self::Ready),
            3 => Some(Self::Failed),
            4 => Some(Self::Selected),
            _ => None,
        }
    }

    /// Lowercase label matching the seed data.
    pub fn label(self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Selected => "selected",
        }
    }
}

/// Request status IDs and transition rules.
pub mod state_machine {
    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Terminal states (Failed=3, Selected=4) return an empty slice because
    /// no further transitions are allowed.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Generating -> Ready, Failed
            1 => &[2, 3],
            // Ready -> Selected
            2 => &[4],
            // Terminal states: Failed, Selected
            3 | 4 => &[],
            // Unknown status: no transitions allowed
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            let from_name = status_name(from);
            let to_name = status_name(to);
            Err(format!(
                "Invalid transition: {from_name} ({from}) -> {to_name} ({to})"
            ))
        }
    }

    /// Human-readable name for a status ID (for error messages).
    fn status_name(id: i16) -> &'static str {
        match id {
            1 => "Generating",
            2 => "Ready",
            3 => "Failed",
            4 => "Selected",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::*;

    // -- valid transitions ----------------------------------------------------

    #[test]
    fn generating_to_ready() {
        assert!(can_transition(1, 2));
    }

    #[test]
    fn generating_to_failed() {
        assert!(can_transition(1, 3));
    }

    #[test]
    fn ready_to_selected() {
        assert!(can_transition(2, 4));
    }

    // -- invalid transitions --------------------------------------------------

    #[test]
    fn generating_cannot_skip_to_selected() {
        assert!(!can_transition(1, 4));
    }

    #[test]
    fn failed_is_terminal() {
        assert!(valid_transitions(3).is_empty());
    }

    #[test]
    fn selected_is_terminal() {
        assert!(valid_transitions(4).is_empty());
    }

    #[test]
    fn ready_cannot_regress_to_generating() {
        assert!(!can_transition(2, 1));
    }

    #[test]
    fn unknown_status_has_no_transitions() {
        assert!(valid_transitions(99).is_empty());
    }

    #[test]
    fn validate_transition_names_both_states() {
        let err = validate_transition(2, 1).unwrap_err();
        assert!(err.contains("Ready"));
        assert!(err.contains("Generating"));
    }

    // -- enum mapping ---------------------------------------------------------

    #[test]
    fn id_round_trip() {
        for status in [
            RequestStatus::Generating,
            RequestStatus::Ready,
            RequestStatus::Failed,
            RequestStatus::Selected,
        ] {
            assert_eq!(RequestStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(RequestStatus::from_id(0), None);
    }

    #[test]
    fn labels_match_seed_data() {
        assert_eq!(RequestStatus::Generating.label(), "generating");
        assert_eq!(RequestStatus::Ready.label(), "ready");
        assert_eq!(RequestStatus::Failed.label(), "failed");
        assert_eq!(RequestStatus::Selected.label(), "selected");
    }
}
