//! Routes for the `/requests` resource: intake plus proposal generation.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use fondant_core::error::CoreError;
use fondant_core::types::DbId;
use fondant_db::models::request::CreateRequest;
use fondant_db::repositories::{ProposalRepo, RequestRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Client-supplied deduplication key for generation calls.
const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/requests
///
/// Create a generation request against an active style pack and size
/// category. Rows start in status Generating; proposals are produced by a
/// follow-up generate call.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRequest>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::create(&state.pool, &input)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(
                "style pack or size category does not exist or is inactive".to_string(),
            )
        })?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// POST /api/v1/requests/{id}/proposals
///
/// Run the generation pipeline for a request and return its proposals.
/// When proposals already exist they are returned as-is without
/// regenerating. An optional `x-idempotency-key` header deduplicates
/// rapid double-submits while a run is in flight.
async fn generate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let idempotency_key = parse_idempotency_key(&headers)?;

    if let Some(key) = idempotency_key {
        if !state.idempotency.try_begin(key).await {
            return Err(AppError::Conflict(
                "a generation with this idempotency key is already in flight".to_string(),
            ));
        }
    }

    let result = state.pipeline.generate_proposals(id).await;

    // Release before surfacing the outcome so a retry after a failure is
    // not locked out for the rest of the TTL.
    if let Some(key) = idempotency_key {
        state.idempotency.finish(key).await;
    }

    let proposals = result?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/requests/{id}/proposals
///
/// List the persisted proposals for a request, best-ranked first.
async fn list_proposals(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Request",
            id,
        }))?;

    let proposals = ProposalRepo::list_for_request(&state.pool, id).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// Read and validate the optional idempotency header.
fn parse_idempotency_key(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(IDEMPOTENCY_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("{IDEMPOTENCY_HEADER} must be valid UTF-8")))?;
    let key = Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("{IDEMPOTENCY_HEADER} must be a UUID")))?;
    Ok(Some(key))
}

/// Routes mounted at `/requests`.
///
/// ```text
/// POST /                  -> create
/// POST /{id}/proposals    -> generate
/// GET  /{id}/proposals    -> list_proposals
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}/proposals", get(list_proposals).post(generate))
}
