//! The generation pipeline: everything between an accepted customer
//! request and its ranked, persisted design proposals.
//!
//! The [`runner::GenerationPipeline`] orchestrates the stages; the other
//! modules each own one stage and can be exercised on their own.

pub mod analysis;
pub mod config;
pub mod constraints;
pub mod context;
pub mod error;
pub mod runner;
pub mod scoring;
pub mod stage1;
pub mod stage2;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use runner::GenerationPipeline;
