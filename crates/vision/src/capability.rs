//! The capability contract the pipeline programs against.
//!
//! The pipeline never talks to a vendor API directly; it consumes this
//! trait, so the HTTP implementation and the scripted mock are
//! interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VisionError;

/// Generation quality tier. Draft is the cheap exploratory tier; Refined
/// is the expensive high-resolution tier used for the winning candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Draft,
    Refined,
}

impl ModelTier {
    /// Output edge length in pixels requested for this tier.
    pub fn edge_px(self) -> u32 {
        match self {
            Self::Draft => 512,
            Self::Refined => 1024,
        }
    }
}

/// One image-generation call.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: String,
    /// Grounding images, resolved to fetchable URLs by the caller.
    pub reference_urls: Vec<String>,
    pub seed: i64,
    pub tier: ModelTier,
}

/// One generated image, carried as a data URL plus decoded dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// One text-completion call, optionally grounded with images.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub prompt: String,
    pub image_urls: Vec<String>,
}

impl TextRequest {
    /// A completion over text alone.
    pub fn text_only(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_urls: Vec::new(),
        }
    }

    /// A completion grounded with one image.
    pub fn about_image(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_urls: vec![image_url.into()],
        }
    }
}

/// The external AI capability: image generation at two quality tiers,
/// vision-grounded text completion, and text embedding.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Generate one image from a prompt, negative prompt, and grounding
    /// references.
    async fn generate_image(&self, request: &ImageRequest)
        -> Result<GeneratedImage, VisionError>;

    /// Answer a free-text question, optionally about one or more images.
    async fn complete_text(&self, request: &TextRequest) -> Result<String, VisionError>;

    /// Embed a text into a vector for similarity comparison.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, VisionError>;
}
