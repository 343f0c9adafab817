//! Routes for the customer-facing tracking page.
//!
//! Lookup is by the opaque access token minted at request creation, not
//! by internal ID, so the link can be shared without authentication.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use fondant_core::status::RequestStatus;
use fondant_db::models::proposal::Proposal;
use fondant_db::models::request::Request;
use fondant_db::repositories::{ProposalRepo, RequestRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Tracking payload: the request, its human-readable status, and any
/// proposals produced so far.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    /// Lowercase status label (`generating`, `ready`, `failed`, `selected`).
    pub status: &'static str,
    pub request: Request,
    pub proposals: Vec<Proposal>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/track/{access_token}
///
/// Retrieve a request and its proposals by access token. A failed
/// generation reads back with status `failed`; the internal error is
/// never exposed here.
async fn track(
    State(state): State<AppState>,
    Path(access_token): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::find_by_access_token(&state.pool, access_token)
        .await?
        .ok_or_else(|| AppError::NotFound("unknown tracking link".to_string()))?;

    let proposals = ProposalRepo::list_for_request(&state.pool, request.id).await?;

    let status = RequestStatus::from_id(request.status_id)
        .map(|s| s.label())
        .unwrap_or("unknown");

    Ok(Json(DataResponse {
        data: TrackResponse {
            status,
            request,
            proposals,
        },
    }))
}

/// Routes mounted at `/track`.
///
/// ```text
/// GET /{access_token}    -> track
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{access_token}", get(track))
}
