//! HTTP capability client for OpenAI-compatible endpoints.
//!
//! Wraps the image-generation, chat-completion, and embedding routes
//! using [`reqwest`]. The concrete endpoint only needs to speak the
//! OpenAI wire shape; it does not have to be OpenAI.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::capability::{
    GeneratedImage, GenerationCapability, ImageRequest, ModelTier, TextRequest,
};
use crate::data_url;
use crate::error::VisionError;

/// Connection settings for a capability endpoint.
#[derive(Debug, Clone)]
pub struct CapabilityConfig {
    /// Base HTTP URL, e.g. `https://api.openai.com`.
    pub base_url: String,
    /// Bearer token sent with every call.
    pub api_key: String,
    /// Model serving Draft-tier image generation.
    pub draft_model: String,
    /// Model serving Refined-tier image generation.
    pub refined_model: String,
    /// Model serving vision-grounded text completion.
    pub text_model: String,
    /// Model serving embeddings.
    pub embed_model: String,
    /// Per-call timeout. One hung call must not consume the pipeline's
    /// whole stage budget.
    pub call_timeout: Duration,
}

impl CapabilityConfig {
    /// Config with the default model lineup and a 30-second call timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            draft_model: "gpt-image-1-mini".to_string(),
            refined_model: "gpt-image-1".to_string(),
            text_model: "gpt-4o-mini".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for a single capability endpoint.
pub struct HttpCapability {
    client: reqwest::Client,
    config: CapabilityConfig,
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl HttpCapability {
    /// Create a new client for a capability endpoint.
    pub fn new(config: CapabilityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across components).
    pub fn with_client(client: reqwest::Client, config: CapabilityConfig) -> Self {
        Self { client, config }
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Draft => &self.config.draft_model,
            ModelTier::Refined => &self.config.refined_model,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{path}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.call_timeout)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`VisionError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VisionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VisionError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationCapability for HttpCapability {
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, VisionError> {
        let edge = request.tier.edge_px();
        let model = self.model_for(request.tier);
        tracing::debug!(
            model = %model,
            seed = request.seed,
            references = request.reference_urls.len(),
            "Requesting image generation"
        );
        let body = serde_json::json!({
            "model": model,
            "prompt": request.prompt,
            "negative_prompt": request.negative_prompt,
            "image_urls": request.reference_urls,
            "seed": request.seed,
            "n": 1,
            "size": format!("{edge}x{edge}"),
            "response_format": "b64_json",
        });

        let response = self.post("/v1/images/generations").json(&body).send().await?;
        let parsed: ImagesResponse = Self::parse_response(response).await?;

        let datum = parsed
            .data
            .into_iter()
            .next()
            .ok_or(VisionError::MissingContent)?;
        let data_url = match (datum.b64_json, datum.url) {
            (Some(b64), _) => data_url::from_png_base64(&b64),
            (None, Some(url)) => url,
            (None, None) => return Err(VisionError::MissingContent),
        };

        let (width, height) = data_url::decode_dimensions(&data_url).unwrap_or_else(|| {
            tracing::warn!(
                model = %model,
                "Payload dimensions unreadable, assuming the requested size"
            );
            (edge, edge)
        });
        Ok(GeneratedImage {
            data_url,
            width,
            height,
        })
    }

    async fn complete_text(&self, request: &TextRequest) -> Result<String, VisionError> {
        let mut content = vec![serde_json::json!({"type": "text", "text": request.prompt})];
        for url in &request.image_urls {
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": {"url": url},
            }));
        }
        let body = serde_json::json!({
            "model": self.config.text_model,
            "messages": [{"role": "user", "content": content}],
        });

        let response = self.post("/v1/chat/completions").json(&body).send().await?;
        let parsed: ChatResponse = Self::parse_response(response).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(VisionError::MissingContent)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, VisionError> {
        let body = serde_json::json!({
            "model": self.config.embed_model,
            "input": text,
        });

        let response = self.post("/v1/embeddings").json(&body).send().await?;
        let parsed: EmbeddingsResponse = Self::parse_response(response).await?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or(VisionError::MissingContent)
    }
}
