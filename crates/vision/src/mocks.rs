//! Scripted capability for tests.
//!
//! `MockCapability` answers every call without network access, counts
//! calls, and logs image requests so tests can assert what reached the
//! generation layer. Text completions are answered by substring rules so
//! concurrent axis calls each get the right canned payload regardless of
//! arrival order.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::capability::{
    GeneratedImage, GenerationCapability, ImageRequest, ModelTier, TextRequest,
};
use crate::data_url;
use crate::error::VisionError;

/// Smallest valid PNG: 1x1 transparent pixel. Stands in for generated
/// image bytes.
const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Scripted in-memory capability.
///
/// Out of the box every call succeeds: images are a 1x1 PNG, completions
/// answer `"75"`, embeddings are a fixed small vector. Tests layer
/// substring rules and failure switches on top.
pub struct MockCapability {
    text_rules: Mutex<Vec<(String, String)>>,
    default_text: Mutex<String>,
    embed_response: Mutex<Vec<f32>>,
    fail_images: AtomicBool,
    fail_tier: Mutex<Option<ModelTier>>,
    fail_text: AtomicBool,
    image_delay: Mutex<Option<Duration>>,
    generate_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    embed_calls: AtomicUsize,
    image_log: Mutex<Vec<ImageRequest>>,
}

impl MockCapability {
    pub fn new() -> Self {
        Self {
            text_rules: Mutex::new(Vec::new()),
            default_text: Mutex::new("75".to_string()),
            embed_response: Mutex::new(vec![0.1; 8]),
            fail_images: AtomicBool::new(false),
            fail_tier: Mutex::new(None),
            fail_text: AtomicBool::new(false),
            image_delay: Mutex::new(None),
            generate_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
            image_log: Mutex::new(Vec::new()),
        }
    }

    /// Answer any completion whose prompt contains `pattern` with
    /// `response`. Rules are checked in insertion order, first match wins.
    pub fn respond_to(&self, pattern: impl Into<String>, response: impl Into<String>) {
        self.text_rules
            .lock()
            .expect("lock poisoned")
            .push((pattern.into(), response.into()));
    }

    /// Change the answer for completions no rule matches.
    pub fn set_default_text(&self, response: impl Into<String>) {
        *self.default_text.lock().expect("lock poisoned") = response.into();
    }

    /// Change the embedding every `embed` call returns.
    pub fn set_embedding(&self, embedding: Vec<f32>) {
        *self.embed_response.lock().expect("lock poisoned") = embedding;
    }

    /// Make every subsequent `generate_image` call fail.
    pub fn fail_images(&self) {
        self.fail_images.store(true, Ordering::SeqCst);
    }

    /// Make `generate_image` fail only at the given tier. Other tiers keep
    /// succeeding.
    pub fn fail_images_at_tier(&self, tier: ModelTier) {
        *self.fail_tier.lock().expect("lock poisoned") = Some(tier);
    }

    /// Delay every `generate_image` response by `delay`.
    pub fn set_image_delay(&self, delay: Duration) {
        *self.image_delay.lock().expect("lock poisoned") = Some(delay);
    }

    /// Make every subsequent `complete_text` call fail.
    pub fn fail_completions(&self) {
        self.fail_text.store(true, Ordering::SeqCst);
    }

    /// Restore image generation after [`MockCapability::fail_images`].
    pub fn restore_images(&self) {
        self.fail_images.store(false, Ordering::SeqCst);
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Every image request seen so far, in call order.
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.image_log.lock().expect("lock poisoned").clone()
    }

    fn mock_failure() -> VisionError {
        VisionError::ApiError {
            status: 500,
            body: "mock failure".to_string(),
        }
    }
}

impl Default for MockCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationCapability for MockCapability {
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, VisionError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.image_log
            .lock()
            .expect("lock poisoned")
            .push(request.clone());

        let delay = *self.image_delay.lock().expect("lock poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_images.load(Ordering::SeqCst) {
            return Err(Self::mock_failure());
        }
        if *self.fail_tier.lock().expect("lock poisoned") == Some(request.tier) {
            return Err(Self::mock_failure());
        }

        let edge = request.tier.edge_px();
        Ok(GeneratedImage {
            data_url: data_url::encode_png(PNG_1X1),
            width: edge,
            height: edge,
        })
    }

    async fn complete_text(&self, request: &TextRequest) -> Result<String, VisionError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_text.load(Ordering::SeqCst) {
            return Err(Self::mock_failure());
        }

        let rules = self.text_rules.lock().expect("lock poisoned");
        for (pattern, response) in rules.iter() {
            if request.prompt.contains(pattern.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_text.lock().expect("lock poisoned").clone())
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, VisionError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_text.load(Ordering::SeqCst) {
            return Err(Self::mock_failure());
        }

        Ok(self.embed_response.lock().expect("lock poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::ModelTier;

    fn image_request() -> ImageRequest {
        ImageRequest {
            prompt: "a cake".to_string(),
            negative_prompt: "blurry".to_string(),
            reference_urls: vec![],
            seed: 7,
            tier: ModelTier::Draft,
        }
    }

    #[tokio::test]
    async fn counts_and_logs_image_calls() {
        let mock = MockCapability::new();
        let image = mock.generate_image(&image_request()).await.unwrap();
        assert_eq!(image.width, 512);
        assert_eq!(mock.generate_calls(), 1);
        assert_eq!(mock.image_requests()[0].seed, 7);
    }

    #[tokio::test]
    async fn text_rules_match_by_substring() {
        let mock = MockCapability::new();
        mock.respond_to("dominant colors", r##"["#FFFFFF"]"##);

        let hit = mock
            .complete_text(&TextRequest::text_only("List the dominant colors as JSON"))
            .await
            .unwrap();
        assert_eq!(hit, r##"["#FFFFFF"]"##);

        let miss = mock
            .complete_text(&TextRequest::text_only("Rate this image"))
            .await
            .unwrap();
        assert_eq!(miss, "75");
    }

    #[tokio::test]
    async fn failure_switches_apply() {
        let mock = MockCapability::new();
        mock.fail_images();
        assert!(mock.generate_image(&image_request()).await.is_err());
        assert_eq!(mock.generate_calls(), 1, "Failed calls still count");

        mock.restore_images();
        assert!(mock.generate_image(&image_request()).await.is_ok());
    }

    #[tokio::test]
    async fn tier_scoped_failure_spares_other_tiers() {
        let mock = MockCapability::new();
        mock.fail_images_at_tier(ModelTier::Refined);

        assert!(mock.generate_image(&image_request()).await.is_ok());

        let refined = ImageRequest {
            tier: ModelTier::Refined,
            ..image_request()
        };
        assert!(mock.generate_image(&refined).await.is_err());
    }
}
