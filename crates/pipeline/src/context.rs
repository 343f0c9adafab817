use fondant_core::style::StyleProfile;
use fondant_core::types::DbId;
use fondant_db::models::reference_image::ReferenceImage;
use fondant_db::models::request::Request;
use fondant_db::models::size_category::SizeCategory;
use fondant_db::models::style_pack::StylePack;
use fondant_db::repositories::{
    RealityRuleRepo, ReferenceImageRepo, RequestRepo, SizeCategoryRepo, StylePackRepo,
};
use sqlx::PgPool;

use crate::error::PipelineError;

/// Generation refuses to run with fewer analyzed reference images than this.
pub const MIN_ANALYZED_REFERENCES: usize = 2;

/// How many reference images ground each generation call, at most.
pub const MAX_REFERENCE_URLS: usize = 3;

/// Everything one pipeline run reads, loaded up front so the stages work
/// from a consistent snapshot.
#[derive(Debug)]
pub struct RequestContext {
    pub request: Request,
    pub style_pack: StylePack,
    pub size_category: SizeCategory,
    pub references: Vec<ReferenceImage>,
    pub style: StyleProfile,
    pub reality_rules: Vec<String>,
}

impl RequestContext {
    /// The tier shape for this run. A pack-level shape template wins over
    /// the size category default.
    pub fn shape(&self) -> &str {
        self.style
            .shape_template
            .as_deref()
            .unwrap_or(&self.size_category.default_shape)
    }

    /// Fetchable URLs for the grounding references, capped at
    /// [`MAX_REFERENCE_URLS`].
    pub fn reference_urls(&self, asset_base_url: &str) -> Vec<String> {
        self.references
            .iter()
            .take(MAX_REFERENCE_URLS)
            .map(|reference| object_url(asset_base_url, &reference.storage_key))
            .collect()
    }
}

/// Resolve a storage key to a fetchable URL.
pub fn object_url(asset_base_url: &str, storage_key: &str) -> String {
    format!("{}/{}", asset_base_url.trim_end_matches('/'), storage_key)
}

/// Load the request and every record its run depends on.
///
/// Enforces the analyzed-reference floor: packs with fewer than
/// [`MIN_ANALYZED_REFERENCES`] analyzed images cannot generate.
pub async fn collect(pool: &PgPool, request_id: DbId) -> Result<RequestContext, PipelineError> {
    let request = RequestRepo::find_by_id(pool, request_id)
        .await?
        .ok_or(PipelineError::MissingEntity {
            entity: "request",
            id: request_id,
        })?;

    let style_pack = StylePackRepo::find_by_id(pool, request.style_pack_id)
        .await?
        .ok_or(PipelineError::MissingEntity {
            entity: "style pack",
            id: request.style_pack_id,
        })?;

    let size_category = SizeCategoryRepo::find_by_id(pool, request.size_category_id)
        .await?
        .ok_or(PipelineError::MissingEntity {
            entity: "size category",
            id: request.size_category_id,
        })?;

    let references = ReferenceImageRepo::list_analyzed_for_pack(pool, style_pack.id).await?;
    if references.len() < MIN_ANALYZED_REFERENCES {
        return Err(PipelineError::InsufficientReferenceImages {
            found: references.len(),
            required: MIN_ANALYZED_REFERENCES,
        });
    }

    let style = style_pack
        .to_style_profile(&references)
        .map_err(|e| PipelineError::MalformedPalette(e.to_string()))?;

    let reality_rules = RealityRuleRepo::list_active(pool)
        .await?
        .into_iter()
        .map(|rule| rule.rule_text)
        .collect();

    Ok(RequestContext {
        request,
        style_pack,
        size_category,
        references,
        style,
        reality_rules,
    })
}
