use fondant_core::types::DbId;
use fondant_vision::VisionError;
use thiserror::Error;

/// Errors surfaced by a pipeline run.
///
/// Anything that escapes the pipeline is fatal for the run: the request is
/// moved to the failed state and the error is returned to the caller.
/// Recoverable trouble (cache faults, scoring failures, stage-2 refinement
/// failures) is absorbed inside the stages and never reaches this enum.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A record the run depends on does not exist.
    #[error("{entity} {id} not found")]
    MissingEntity { entity: &'static str, id: DbId },

    /// The style pack does not carry enough reference images for the
    /// requested operation.
    #[error("style pack has {found} reference images, needs at least {required}")]
    InsufficientReferenceImages { found: usize, required: usize },

    /// The style pack's stored palette or reference summaries could not be
    /// decoded.
    #[error("malformed style pack data: {0}")]
    MalformedPalette(String),

    /// Stage-1 generation did not finish inside its collective deadline.
    #[error("stage-1 generation exceeded its {budget_secs}s budget")]
    GenerationTimeout { budget_secs: u64 },

    /// A stage-1 draft call failed. Stage 1 is all-or-nothing, so one
    /// failed draft fails the run.
    #[error("stage-1 generation failed: {0}")]
    Stage1Failed(VisionError),

    /// A vision capability call failed outside of stage 1.
    #[error(transparent)]
    Vision(#[from] VisionError),

    /// The database rejected a query the run cannot proceed without.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
