//! Pure domain logic for the proposal generation pipeline.
//!
//! Everything in this crate is deterministic, synchronous, and free of
//! internal dependencies so it can be used by the repository layer, the
//! pipeline orchestrator, and any future CLI tooling alike.

pub mod audit;
pub mod cache_key;
pub mod color;
pub mod compat;
pub mod density;
pub mod error;
pub mod forbidden;
pub mod hashing;
pub mod prompt;
pub mod quality;
pub mod status;
pub mod style;
pub mod tiers;
pub mod types;
