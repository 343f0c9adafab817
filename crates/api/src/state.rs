use std::sync::Arc;

use fondant_pipeline::GenerationPipeline;

use crate::config::ServerConfig;
use crate::idempotency::IdempotencyGuard;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fondant_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Proposal generation pipeline.
    pub pipeline: Arc<GenerationPipeline>,
    /// Best-effort double-submit guard for generation calls.
    pub idempotency: Arc<IdempotencyGuard>,
}
