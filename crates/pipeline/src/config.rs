use std::time::Duration;

/// Tuning knobs for proposal generation.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Collective deadline for all stage-1 draft calls, in seconds
    /// (default: `45`).
    pub stage1_budget_secs: u64,
    /// Draft candidates generated per prompt variant (default: `2`).
    pub candidates_per_variant: usize,
    /// How many ranked candidates survive into refinement and persistence
    /// (default: `3`).
    pub top_k: usize,
    /// Maximum generation or analysis calls in flight at once (default: `2`).
    pub max_in_flight: usize,
    /// Base URL reference-image storage keys are resolved against
    /// (default: `http://localhost:9000/fondant-assets`).
    pub asset_base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage1_budget_secs: 45,
            candidates_per_variant: 2,
            top_k: 3,
            max_in_flight: 2,
            asset_base_url: "http://localhost:9000/fondant-assets".into(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                               |
    /// |--------------------------|---------------------------------------|
    /// | `STAGE1_BUDGET_SECS`     | `45`                                  |
    /// | `CANDIDATES_PER_VARIANT` | `2`                                   |
    /// | `PROPOSAL_TOP_K`         | `3`                                   |
    /// | `GENERATION_MAX_IN_FLIGHT` | `2`                                 |
    /// | `ASSET_BASE_URL`         | `http://localhost:9000/fondant-assets`|
    pub fn from_env() -> Self {
        let stage1_budget_secs: u64 = std::env::var("STAGE1_BUDGET_SECS")
            .unwrap_or_else(|_| "45".into())
            .parse()
            .expect("STAGE1_BUDGET_SECS must be a valid u64");

        let candidates_per_variant: usize = std::env::var("CANDIDATES_PER_VARIANT")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("CANDIDATES_PER_VARIANT must be a valid usize");

        let top_k: usize = std::env::var("PROPOSAL_TOP_K")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("PROPOSAL_TOP_K must be a valid usize");

        let max_in_flight: usize = std::env::var("GENERATION_MAX_IN_FLIGHT")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("GENERATION_MAX_IN_FLIGHT must be a valid usize");

        let asset_base_url = std::env::var("ASSET_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:9000/fondant-assets".into());

        Self {
            stage1_budget_secs,
            candidates_per_variant,
            top_k,
            max_in_flight,
            asset_base_url,
        }
    }

    /// The stage-1 deadline as a [`Duration`].
    pub fn stage1_budget(&self) -> Duration {
        Duration::from_secs(self.stage1_budget_secs)
    }
}
