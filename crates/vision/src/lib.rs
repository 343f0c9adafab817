//! Client library for the external vision and generation capability.
//!
//! Provides the capability trait the pipeline programs against, an HTTP
//! implementation for OpenAI-compatible endpoints, tolerant parsing of
//! model-produced JSON, data-URL helpers, and a scripted mock for tests.

pub mod api;
pub mod capability;
pub mod data_url;
pub mod error;
pub mod mocks;
pub mod parse;

pub use api::{CapabilityConfig, HttpCapability};
pub use capability::{
    GeneratedImage, GenerationCapability, ImageRequest, ModelTier, TextRequest,
};
pub use error::VisionError;
pub use mocks::MockCapability;
