//! Stage-1 exploration: cheap draft renders behind the content cache.
//!
//! Drafts for the same style pack, filtered brief, and size category are
//! reused for a full TTL. Cache faults of any kind degrade to a regular
//! generation pass and are never surfaced to the caller.

use fondant_core::cache_key::Stage1Key;
use fondant_core::prompt::{Variant, VariantPrompt};
use fondant_db::repositories::Stage1CacheRepo;
use fondant_vision::{GeneratedImage, GenerationCapability, ImageRequest, ModelTier, VisionError};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// One draft render, as produced by stage 1 and stored in the cache
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCandidate {
    pub variant: Variant,
    pub seed: i64,
    pub prompt: String,
    pub negative_prompt: String,
    pub image: GeneratedImage,
}

/// Produce the draft set for one run, consulting the cache first.
///
/// On a miss, every variant renders `candidates_per_variant` drafts at the
/// cheap tier through a pool of at most `max_in_flight` concurrent calls,
/// all under one collective deadline. Stage 1 is all-or-nothing: a single
/// failed call or a blown deadline fails the run.
pub async fn run(
    pool: &PgPool,
    capability: &dyn GenerationCapability,
    config: &PipelineConfig,
    key: &Stage1Key,
    prompts: &[VariantPrompt],
    reference_urls: &[String],
    seeds: &[i64],
) -> Result<Vec<DraftCandidate>, PipelineError> {
    if let Some(drafts) = cached_drafts(pool, key).await {
        return Ok(drafts);
    }

    let requests: Vec<(Variant, ImageRequest)> = prompts
        .iter()
        .flat_map(|vp| std::iter::repeat(vp).take(config.candidates_per_variant))
        .zip(seeds.iter().copied())
        .map(|(vp, seed)| {
            (
                vp.variant,
                ImageRequest {
                    prompt: vp.prompt.clone(),
                    negative_prompt: vp.negative_prompt.clone(),
                    reference_urls: reference_urls.to_vec(),
                    seed,
                    tier: ModelTier::Draft,
                },
            )
        })
        .collect();

    tracing::info!(
        style_pack_id = key.style_pack_id,
        drafts = requests.len(),
        "Stage-1 cache miss; rendering drafts"
    );

    let generate_all = stream::iter(requests.into_iter().map(|(variant, request)| async move {
        let image = capability.generate_image(&request).await?;
        Ok::<_, VisionError>(DraftCandidate {
            variant,
            seed: request.seed,
            prompt: request.prompt,
            negative_prompt: request.negative_prompt,
            image,
        })
    }))
    .buffered(config.max_in_flight)
    .try_collect::<Vec<_>>();

    let drafts = match tokio::time::timeout(config.stage1_budget(), generate_all).await {
        Ok(Ok(drafts)) => drafts,
        Ok(Err(error)) => return Err(PipelineError::Stage1Failed(error)),
        Err(_) => {
            return Err(PipelineError::GenerationTimeout {
                budget_secs: config.stage1_budget_secs,
            })
        }
    };

    store_drafts(pool, key, &drafts).await;
    Ok(drafts)
}

/// Fetch and decode a live cache entry, refreshing its TTL on the way out.
/// Any fault reads as a miss.
async fn cached_drafts(pool: &PgPool, key: &Stage1Key) -> Option<Vec<DraftCandidate>> {
    let entry = match Stage1CacheRepo::get(pool, key).await {
        Ok(entry) => entry?,
        Err(e) => {
            tracing::error!(error = %e, "Stage-1 cache read failed");
            return None;
        }
    };

    match serde_json::from_value::<Vec<DraftCandidate>>(entry.payload) {
        Ok(drafts) if !drafts.is_empty() => {
            tracing::info!(
                style_pack_id = key.style_pack_id,
                drafts = drafts.len(),
                "Stage-1 cache hit"
            );
            match Stage1CacheRepo::touch(pool, key).await {
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Stage-1 cache TTL refresh failed"),
            }
            Some(drafts)
        }
        Ok(_) => None,
        Err(e) => {
            tracing::error!(error = %e, "Discarding undecodable stage-1 cache entry");
            None
        }
    }
}

/// Write the fresh draft set back to the cache. Failures are logged and
/// swallowed; the run already has its drafts in hand.
async fn store_drafts(pool: &PgPool, key: &Stage1Key, drafts: &[DraftCandidate]) {
    let payload = match serde_json::to_value(drafts) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize stage-1 drafts for caching");
            return;
        }
    };
    if let Err(e) = Stage1CacheRepo::put(pool, key, &payload).await {
        tracing::error!(error = %e, "Failed to write stage-1 cache entry");
    }
}
