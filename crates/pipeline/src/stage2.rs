//! Stage-2 refinement: re-render the winning candidates at the high tier.
//!
//! Refinement is best-effort per candidate. A failed refinement keeps the
//! stage-1 draft, so the customer always sees the number of proposals the
//! ranking chose.

use fondant_vision::{GeneratedImage, GenerationCapability, ImageRequest, ModelTier};
use futures::stream::{self, StreamExt};

use crate::config::PipelineConfig;
use crate::scoring::ScoredCandidate;

/// Quality directives appended to a winning prompt before the high-tier
/// render.
const REFINEMENT_DIRECTIVES: &str = "Render at maximum quality: ultra-detailed, high \
     resolution, flawless fondant finish, professional food photography.";

/// Marker for a proposal whose image is the stage-1 draft.
pub const STAGE_DRAFT: i16 = 1;
/// Marker for a proposal re-rendered at the refined tier.
pub const STAGE_REFINED: i16 = 2;

/// A candidate after refinement, ready to persist.
#[derive(Debug, Clone)]
pub struct FinalCandidate {
    pub scored: ScoredCandidate,
    /// The exact prompt the final image was rendered with.
    pub prompt: String,
    pub image: GeneratedImage,
    pub stage: i16,
}

/// Extend a winning prompt with the refinement quality directives.
pub fn refine_prompt(prompt: &str) -> String {
    format!("{prompt}\n\n{REFINEMENT_DIRECTIVES}")
}

/// Re-render each winner at the refined tier, reusing its seed and
/// grounding references so the composition holds.
pub async fn refine_batch(
    capability: &dyn GenerationCapability,
    config: &PipelineConfig,
    reference_urls: &[String],
    winners: Vec<ScoredCandidate>,
) -> Vec<FinalCandidate> {
    stream::iter(winners.into_iter().map(|scored| async move {
        let refined = refine_prompt(&scored.draft.prompt);
        let request = ImageRequest {
            prompt: refined.clone(),
            negative_prompt: scored.draft.negative_prompt.clone(),
            reference_urls: reference_urls.to_vec(),
            seed: scored.draft.seed,
            tier: ModelTier::Refined,
        };
        match capability.generate_image(&request).await {
            Ok(image) => FinalCandidate {
                prompt: refined,
                image,
                stage: STAGE_REFINED,
                scored,
            },
            Err(e) => {
                tracing::warn!(
                    seed = scored.draft.seed,
                    error = %e,
                    "Refinement failed; keeping the stage-1 draft"
                );
                FinalCandidate {
                    prompt: scored.draft.prompt.clone(),
                    image: scored.draft.image.clone(),
                    stage: STAGE_DRAFT,
                    scored,
                }
            }
        }
    }))
    .buffered(config.max_in_flight)
    .collect()
    .await
}
