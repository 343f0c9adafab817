//! Reference-image analysis: palette, texture tags, density, and a style
//! embedding per image, written back through an idempotent upsert.

use fondant_core::density::Density;
use fondant_core::style::PaletteColor;
use fondant_core::types::DbId;
use fondant_db::models::reference_image::{ReferenceAnalysis, ReferenceImage};
use fondant_db::repositories::ReferenceImageRepo;
use fondant_vision::parse::lenient_json;
use fondant_vision::{GenerationCapability, TextRequest, VisionError};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use sqlx::PgPool;

use crate::config::PipelineConfig;
use crate::context::object_url;
use crate::error::PipelineError;

/// Batch analysis refuses to run on packs with fewer uploads than this.
pub const MIN_IMAGES_FOR_ANALYSIS: usize = 3;

/// What the capability is asked to produce for each reference photo.
#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    palette: Vec<PaletteColor>,
    #[serde(default)]
    texture_tags: Vec<String>,
    density: Density,
}

/// Analyze every not-yet-analyzed reference image of a style pack.
///
/// The pack must carry at least [`MIN_IMAGES_FOR_ANALYSIS`] uploads before
/// the batch runs at all; below that the pack cannot produce a meaningful
/// style profile and curators should upload more instead. Re-running is
/// safe: analyzed images are skipped, and re-analysis of an image
/// overwrites its previous summary.
pub async fn auto_analyze(
    pool: &PgPool,
    capability: &dyn GenerationCapability,
    config: &PipelineConfig,
    style_pack_id: DbId,
) -> Result<Vec<ReferenceImage>, PipelineError> {
    let uploaded = ReferenceImageRepo::count_for_pack(pool, style_pack_id).await? as usize;
    if uploaded < MIN_IMAGES_FOR_ANALYSIS {
        return Err(PipelineError::InsufficientReferenceImages {
            found: uploaded,
            required: MIN_IMAGES_FOR_ANALYSIS,
        });
    }

    let pending = ReferenceImageRepo::list_pending_for_pack(pool, style_pack_id).await?;
    if pending.is_empty() {
        tracing::info!(style_pack_id, "No pending reference images to analyze");
        return Ok(Vec::new());
    }

    tracing::info!(
        style_pack_id,
        pending = pending.len(),
        "Analyzing reference images"
    );

    let asset_base_url = config.asset_base_url.as_str();
    let analyses: Vec<(String, ReferenceAnalysis)> =
        stream::iter(pending.into_iter().map(|image| async move {
            let analysis =
                analyze_one(capability, &object_url(asset_base_url, &image.storage_key)).await?;
            Ok::<_, VisionError>((image.storage_key, analysis))
        }))
        .buffered(config.max_in_flight)
        .try_collect()
        .await?;

    let mut updated = Vec::with_capacity(analyses.len());
    for (storage_key, analysis) in &analyses {
        updated.push(
            ReferenceImageRepo::upsert_analysis(pool, style_pack_id, storage_key, analysis)
                .await?,
        );
    }

    tracing::info!(style_pack_id, analyzed = updated.len(), "Reference analysis complete");
    Ok(updated)
}

/// Run the two capability calls for one image: the structured summary and
/// the style embedding over its textual digest.
async fn analyze_one(
    capability: &dyn GenerationCapability,
    image_url: &str,
) -> Result<ReferenceAnalysis, VisionError> {
    let prompt = "Analyze this cake reference photo. Respond with only a JSON object shaped \
                  {\"palette\": [{\"hex\": \"#RRGGBB\", \"ratio\": 0.0-1.0}, ...], \
                  \"texture_tags\": [strings], \"density\": \"low\"|\"mid\"|\"high\"}, \
                  with at most 5 palette entries ordered by coverage.";
    let response = capability
        .complete_text(&TextRequest::about_image(prompt, image_url))
        .await?;

    let payload: AnalysisPayload = lenient_json(&response)
        .and_then(|value| {
            serde_json::from_value(value).map_err(|e| VisionError::Parse(e.to_string()))
        })?;

    let embedding = capability.embed(&style_digest(&payload)).await?;

    Ok(ReferenceAnalysis {
        palette: serde_json::to_value(&payload.palette).unwrap_or_default(),
        texture_tags: payload.texture_tags,
        density_id: payload.density.id(),
        embedding: Some(embedding),
    })
}

/// Canonical text form of a summary, fed to the embedding model so packs
/// can be compared to customer inspiration images.
fn style_digest(payload: &AnalysisPayload) -> String {
    let hexes: Vec<&str> = payload.palette.iter().map(|c| c.hex.as_str()).collect();
    format!(
        "cake style: palette {}; textures {}; density {}",
        hexes.join(" "),
        payload.texture_tags.join(", "),
        payload.density.label(),
    )
}
