//! Fondant API server library.
//!
//! Exposes the building blocks (config, state, error handling, router,
//! routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod config;
pub mod error;
pub mod idempotency;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
