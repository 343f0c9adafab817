use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fondant_core::error::CoreError;
use fondant_pipeline::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for generation failures and [`CoreError`] for
/// domain errors, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A generation failure from `fondant_pipeline`.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A domain-level error from `fondant_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource with a human-readable message, for lookups not
    /// keyed by an internal ID.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A resource conflict with a human-readable message.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- PipelineError variants ---
            AppError::Pipeline(pipeline) => match pipeline {
                PipelineError::MissingEntity { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", pipeline.to_string())
                }
                PipelineError::InsufficientReferenceImages { .. }
                | PipelineError::MalformedPalette(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PRECONDITION_FAILED",
                    pipeline.to_string(),
                ),
                PipelineError::GenerationTimeout { .. } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "GENERATION_TIMEOUT",
                    "Generation took too long, please try again".to_string(),
                ),
                // Capability details stay in the logs. Customers get a
                // generic retry-capable message.
                PipelineError::Stage1Failed(err) => {
                    tracing::error!(error = %err, "Stage-1 generation failed");
                    (
                        StatusCode::BAD_GATEWAY,
                        "GENERATION_FAILED",
                        "Generation is temporarily unavailable, please try again".to_string(),
                    )
                }
                PipelineError::Vision(err) => {
                    tracing::error!(error = %err, "Vision capability failed");
                    (
                        StatusCode::BAD_GATEWAY,
                        "GENERATION_FAILED",
                        "Generation is temporarily unavailable, please try again".to_string(),
                    )
                }
                PipelineError::Database(err) => classify_sqlx_error(err),
            },

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidColorFormat(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Invalid color format: {msg}"),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
