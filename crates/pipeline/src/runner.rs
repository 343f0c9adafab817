//! Central proposal-generation orchestrator.
//!
//! Coordinates context collection, compatibility checking, constraint
//! building, two-stage generation, scoring, and persistence. Held by the
//! API server as an `Arc<GenerationPipeline>`.

use std::sync::Arc;

use fondant_core::audit::action_types;
use fondant_core::cache_key::Stage1Key;
use fondant_core::compat;
use fondant_core::prompt::{self, PromptInput};
use fondant_core::quality::BADGE_HIGH_QUALITY;
use fondant_core::status::RequestStatus;
use fondant_core::style::CustomerIntent;
use fondant_core::types::DbId;
use fondant_db::models::audit_log::CreateAuditLog;
use fondant_db::models::proposal::{CreateProposal, Proposal};
use fondant_db::repositories::{AuditLogRepo, ProposalRepo, RequestRepo};
use fondant_vision::GenerationCapability;
use rand::Rng;
use serde_json::json;
use sqlx::PgPool;

use crate::config::PipelineConfig;
use crate::constraints::{self, ConstraintBundle};
use crate::context;
use crate::error::PipelineError;
use crate::scoring;
use crate::stage1;
use crate::stage2;

/// Orchestrates one customer request from brief to persisted proposals.
///
/// Manages the full lifecycle:
/// 1. Collect the context snapshot (request, pack, size, references, rules).
/// 2. Check pack/intent compatibility (recorded, never fatal).
/// 3. Build the constraint bundle (filtered brief, palette lock, layout).
/// 4. Synthesize the three variant prompts.
/// 5. Render stage-1 drafts through the content cache.
/// 6. Score every draft and rank the field.
/// 7. Refine the top candidates at the high tier.
/// 8. Persist proposals and move the request to ready.
///
/// Any error out of steps 1-8 moves the request to failed instead.
pub struct GenerationPipeline {
    pool: PgPool,
    capability: Arc<dyn GenerationCapability>,
    config: PipelineConfig,
}

impl GenerationPipeline {
    /// Create a pipeline over the given pool and vision capability.
    pub fn new(
        pool: PgPool,
        capability: Arc<dyn GenerationCapability>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            pool,
            capability,
            config,
        }
    }

    /// Generate and persist the proposal set for a request.
    ///
    /// Safe to call repeatedly: once a request has proposals, they are
    /// returned as-is with no further generation or state transitions.
    pub async fn generate_proposals(
        &self,
        request_id: DbId,
    ) -> Result<Vec<Proposal>, PipelineError> {
        if ProposalRepo::exists_for_request(&self.pool, request_id).await? {
            tracing::info!(request_id, "Proposals already exist; returning them");
            return Ok(ProposalRepo::list_for_request(&self.pool, request_id).await?);
        }

        match self.run(request_id).await {
            Ok(proposals) => Ok(proposals),
            Err(error) => {
                tracing::error!(request_id, error = %error, "Proposal generation failed");
                self.mark_failed(request_id, &error).await;
                Err(error)
            }
        }
    }

    async fn run(&self, request_id: DbId) -> Result<Vec<Proposal>, PipelineError> {
        // 1. Collect the context snapshot.
        let ctx = context::collect(&self.pool, request_id).await?;
        tracing::info!(
            request_id,
            style_pack_id = ctx.style_pack.id,
            size_category_id = ctx.size_category.id,
            "Proposal generation started"
        );
        self.audit(&[audit_entry(
            request_id,
            action_types::GENERATION_STARTED,
            json!({
                "style_pack_id": ctx.style_pack.id,
                "size_category_id": ctx.size_category.id,
            }),
        )])
        .await;

        // 2. Compatibility check. Conflicts are recorded, never fatal.
        let mut audits = Vec::new();
        if let Some(brief) = ctx
            .request
            .brief
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
        {
            let intent = CustomerIntent {
                text: brief.to_string(),
                ..CustomerIntent::default()
            };
            let report = compat::check_compatibility(&ctx.style, &intent);
            for conflict in &report.conflicts {
                tracing::warn!(
                    request_id,
                    kind = ?conflict.kind,
                    severity = ?conflict.severity,
                    message = %conflict.message,
                    "Compatibility conflict between brief and style pack"
                );
                audits.push(audit_entry(
                    request_id,
                    action_types::COMPATIBILITY_CONFLICT,
                    serde_json::to_value(conflict).unwrap_or_default(),
                ));
            }
        }

        // 3. Build the constraint bundle.
        let ConstraintBundle {
            brief,
            layout_description,
            audits: constraint_audits,
        } = {
            let mut rng = rand::rng();
            constraints::build(
                request_id,
                &ctx.style,
                ctx.request.brief.as_deref(),
                ctx.size_category.tier_count,
                ctx.shape(),
                &mut rng,
            )?
        };
        audits.extend(constraint_audits);
        self.audit(&audits).await;

        // 4. Synthesize the variant prompts.
        let prompts = prompt::synthesize(&PromptInput {
            style: &ctx.style,
            brief: brief.as_deref(),
            tier_count: ctx.size_category.tier_count,
            shape: ctx.shape(),
            layout_description: &layout_description,
            reality_rules: &ctx.reality_rules,
        });

        // 5. Stage-1 drafts through the content cache.
        let key = Stage1Key::new(
            ctx.request.style_pack_id,
            brief.as_deref().unwrap_or(""),
            ctx.request.size_category_id,
        );
        let reference_urls = ctx.reference_urls(&self.config.asset_base_url);
        let seeds: Vec<i64> = {
            let mut rng = rand::rng();
            (0..prompts.len() * self.config.candidates_per_variant)
                .map(|_| rng.random_range(0..i64::MAX))
                .collect()
        };
        let drafts = stage1::run(
            &self.pool,
            self.capability.as_ref(),
            &self.config,
            &key,
            &prompts,
            &reference_urls,
            &seeds,
        )
        .await?;

        // 6. Score every draft, flag weak ones, rank the field.
        let scored = scoring::evaluate_batch(
            self.capability.as_ref(),
            &ctx.style,
            brief.as_deref(),
            drafts,
        )
        .await;
        let low_quality: Vec<CreateAuditLog> = scored
            .iter()
            .filter(|candidate| candidate.scores.is_low_quality())
            .map(|candidate| {
                tracing::warn!(
                    request_id,
                    variant = ?candidate.draft.variant,
                    seed = candidate.draft.seed,
                    overall = candidate.overall,
                    "Candidate flagged as low quality"
                );
                audit_entry(
                    request_id,
                    action_types::LOW_QUALITY_FLAGGED,
                    json!({
                        "variant": candidate.draft.variant,
                        "seed": candidate.draft.seed,
                        "overall": candidate.overall,
                    }),
                )
            })
            .collect();
        self.audit(&low_quality).await;
        let mut ranked = scoring::rank(scored);

        // 7. Refine the top candidates at the high tier.
        ranked.truncate(self.config.top_k);
        let finals = stage2::refine_batch(
            self.capability.as_ref(),
            &self.config,
            &reference_urls,
            ranked,
        )
        .await;

        // 8. Persist proposals, then move the request to ready.
        let inputs: Vec<CreateProposal> = finals
            .iter()
            .map(|candidate| CreateProposal {
                request_id,
                variant_id: candidate.scored.draft.variant.id(),
                image_key: candidate.image.data_url.clone(),
                prompt: candidate.prompt.clone(),
                negative_prompt: candidate.scored.draft.negative_prompt.clone(),
                seed: candidate.scored.draft.seed,
                stage: candidate.stage,
                scores: serde_json::to_value(candidate.scored.scores).unwrap_or_default(),
                rank_score: candidate.scored.overall,
                price_min_cents: ctx.size_category.price_min_cents,
                price_max_cents: ctx.size_category.price_max_cents,
                badges: if candidate.scored.scores.earns_high_quality_badge() {
                    vec![BADGE_HIGH_QUALITY.to_string()]
                } else {
                    Vec::new()
                },
            })
            .collect();
        let proposals = ProposalRepo::create_batch(&self.pool, &inputs).await?;

        // The ready flip is a CAS from generating. Losing it is not fatal
        // once the proposals are safely persisted.
        match RequestRepo::update_status(
            &self.pool,
            request_id,
            RequestStatus::Generating.id(),
            RequestStatus::Ready.id(),
        )
        .await
        {
            Ok(Some(_)) => {}
            Ok(None) => tracing::error!(
                request_id,
                "Request left the generating state mid-run; proposals persisted anyway"
            ),
            Err(e) => tracing::error!(request_id, error = %e, "Failed to mark request ready"),
        }

        self.audit(&[audit_entry(
            request_id,
            action_types::GENERATION_COMPLETED,
            json!({ "proposals": proposals.len() }),
        )])
        .await;

        tracing::info!(
            request_id,
            proposals = proposals.len(),
            "Proposal generation complete"
        );
        Ok(proposals)
    }

    /// Move the request to failed and record why. All best-effort; the
    /// original error is what the caller sees.
    async fn mark_failed(&self, request_id: DbId, error: &PipelineError) {
        match RequestRepo::update_status(
            &self.pool,
            request_id,
            RequestStatus::Generating.id(),
            RequestStatus::Failed.id(),
        )
        .await
        {
            Ok(Some(_)) => {
                self.audit(&[audit_entry(
                    request_id,
                    action_types::GENERATION_FAILED,
                    json!({ "error": error.to_string() }),
                )])
                .await;
            }
            Ok(None) => {
                tracing::warn!(request_id, "Request not in generating state; failure not recorded")
            }
            Err(e) => tracing::error!(request_id, error = %e, "Failed to mark request failed"),
        }
    }

    /// Persist a batch of audit entries. Audit faults are logged and
    /// swallowed; the trail is observability, not control flow.
    async fn audit(&self, entries: &[CreateAuditLog]) {
        if entries.is_empty() {
            return;
        }
        if let Err(e) = AuditLogRepo::create_batch(&self.pool, entries).await {
            tracing::error!(error = %e, "Failed to write audit entries");
        }
    }
}

fn audit_entry(request_id: DbId, action_type: &str, details: serde_json::Value) -> CreateAuditLog {
    CreateAuditLog {
        request_id: Some(request_id),
        action_type: action_type.to_string(),
        details,
    }
}
