//! Routes for the `/proposals` resource: customer selection.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use fondant_core::audit::action_types;
use fondant_core::error::CoreError;
use fondant_core::status::RequestStatus;
use fondant_core::types::DbId;
use fondant_db::models::audit_log::CreateAuditLog;
use fondant_db::repositories::{AuditLogRepo, ProposalRepo, SelectOutcome};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/proposals/{id}/select
///
/// Mark one proposal as the request's selection, un-marking any other.
/// Allowed while the request is Ready (first pick) or Selected (changing
/// the pick).
async fn select(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let proposal = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    match ProposalRepo::select_exclusive(&state.pool, proposal.request_id, id).await? {
        SelectOutcome::Selected(selected) => {
            let entry = CreateAuditLog {
                request_id: Some(selected.request_id),
                action_type: action_types::PROPOSAL_SELECTED.to_string(),
                details: json!({ "proposal_id": selected.id }),
            };
            if let Err(e) = AuditLogRepo::create(&state.pool, &entry).await {
                tracing::error!(error = %e, "Failed to record selection audit entry");
            }
            Ok(Json(DataResponse { data: selected }))
        }
        SelectOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        })),
        SelectOutcome::WrongStatus(status_id) => {
            let label = RequestStatus::from_id(status_id)
                .map(|s| s.label())
                .unwrap_or("unknown");
            Err(AppError::Conflict(format!(
                "request is {label}; selection requires a ready or selected request"
            )))
        }
    }
}

/// Routes mounted at `/proposals`.
///
/// ```text
/// POST /{id}/select    -> select
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/select", post(select))
}
