//! Quality evaluation: four score axes per candidate, each degrading to a
//! neutral default when the capability misbehaves.
//!
//! Scoring never fails a run. A scoring outage flattens the ranking but
//! the customer still gets proposals.

use fondant_core::color::{self, Lab};
use fondant_core::quality::{
    self, FeasibilityIssue, QualityScores, DEFAULT_AESTHETIC, DEFAULT_BAKEABILITY,
    DEFAULT_ON_BRIEF, DEFAULT_PALETTE_FIT,
};
use fondant_core::style::{PaletteColor, StyleProfile};
use fondant_vision::parse::lenient_json;
use fondant_vision::{GenerationCapability, TextRequest};
use futures::future::join_all;

use crate::stage1::DraftCandidate;

/// A draft with its quality verdict attached.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub draft: DraftCandidate,
    pub scores: QualityScores,
    pub overall: f64,
}

/// Score every draft. Candidates are evaluated concurrently and returned
/// in input order.
pub async fn evaluate_batch(
    capability: &dyn GenerationCapability,
    style: &StyleProfile,
    brief: Option<&str>,
    drafts: Vec<DraftCandidate>,
) -> Vec<ScoredCandidate> {
    join_all(
        drafts
            .into_iter()
            .map(|draft| evaluate(capability, style, brief, draft)),
    )
    .await
}

/// Score one draft across all four axes concurrently.
pub async fn evaluate(
    capability: &dyn GenerationCapability,
    style: &StyleProfile,
    brief: Option<&str>,
    draft: DraftCandidate,
) -> ScoredCandidate {
    let image_url = draft.image.data_url.clone();
    let (on_brief, palette_fit, bakeability, aesthetic) = tokio::join!(
        score_on_brief(capability, brief, &image_url),
        score_palette_fit(capability, &style.palette, &image_url),
        score_bakeability(capability, &image_url),
        score_aesthetic(capability, &image_url),
    );

    let scores = QualityScores {
        on_brief,
        palette_fit,
        bakeability,
        aesthetic,
    };
    let overall = scores.overall();
    ScoredCandidate {
        draft,
        scores,
        overall,
    }
}

/// Sort scored candidates best-first. The sort is stable, so equal scores
/// keep their variant order.
pub fn rank(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| b.overall.total_cmp(&a.overall));
    scored
}

// ---------------------------------------------------------------------------
// Score axes
// ---------------------------------------------------------------------------

async fn score_on_brief(
    capability: &dyn GenerationCapability,
    brief: Option<&str>,
    image_url: &str,
) -> f64 {
    let subject =
        brief.unwrap_or("a professionally styled custom cake true to the reference designs");
    let prompt = format!(
        "Rate from 0 to 100 how well this cake design matches the customer's request: \
         \"{subject}\". Respond with only the number."
    );
    match capability
        .complete_text(&TextRequest::about_image(prompt, image_url))
        .await
    {
        Ok(text) => match quality::parse_rating(&text) {
            Some(rating) => f64::from(rating) / 100.0,
            None => {
                tracing::warn!(response = %text, "Unparseable on-brief rating; using default");
                DEFAULT_ON_BRIEF
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "On-brief scoring call failed; using default");
            DEFAULT_ON_BRIEF
        }
    }
}

/// Palette fit: extract the image's dominant colors and measure their
/// average distance to the nearest locked-palette entry. Packs without a
/// locked palette score a perfect fit with no capability call.
async fn score_palette_fit(
    capability: &dyn GenerationCapability,
    palette: &[PaletteColor],
    image_url: &str,
) -> f64 {
    let locked = palette_labs(palette);
    if locked.is_empty() {
        return 1.0;
    }

    let prompt = "List the dominant colors of this cake as a JSON array of hex strings, \
                  most prominent first, at most 5 entries. Respond with only the JSON.";
    let response = match capability
        .complete_text(&TextRequest::about_image(prompt, image_url))
        .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Palette-fit scoring call failed; using default");
            return DEFAULT_PALETTE_FIT;
        }
    };

    let extracted = match lenient_json(&response) {
        Ok(value) => hex_list(&value),
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable dominant-color response; using default");
            return DEFAULT_PALETTE_FIT;
        }
    };

    match average_min_delta(&extracted, &locked) {
        Some(avg_delta) => quality::palette_fit_from_avg_delta(avg_delta),
        None => {
            tracing::warn!(response = %response, "No usable colors in response; using default");
            DEFAULT_PALETTE_FIT
        }
    }
}

async fn score_bakeability(capability: &dyn GenerationCapability, image_url: &str) -> f64 {
    let prompt = "Inspect this cake design for construction problems a real baker could not \
                  solve. Respond with only a JSON array of issue objects, each \
                  {\"kind\": ..., \"severity\": 0.0-1.0}, where kind is one of \
                  gravity_violation, non_edible_texture, logo_replication, text_distortion, \
                  unrealistic_structure. Use an empty array if the design is buildable.";
    match capability
        .complete_text(&TextRequest::about_image(prompt, image_url))
        .await
    {
        Ok(text) => {
            let issues = lenient_json(&text)
                .ok()
                .and_then(|value| serde_json::from_value::<Vec<FeasibilityIssue>>(value).ok());
            match issues {
                Some(issues) => quality::bakeability_from_issues(&issues),
                None => {
                    tracing::warn!(response = %text, "Unparseable feasibility response; using default");
                    DEFAULT_BAKEABILITY
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Bakeability scoring call failed; using default");
            DEFAULT_BAKEABILITY
        }
    }
}

async fn score_aesthetic(capability: &dyn GenerationCapability, image_url: &str) -> f64 {
    let prompt = "Rate from 0 to 100 the sharpness, lighting, composition and overall \
                  professional finish of this cake photograph. Respond with only the number.";
    match capability
        .complete_text(&TextRequest::about_image(prompt, image_url))
        .await
    {
        Ok(text) => match quality::parse_rating(&text) {
            Some(rating) => f64::from(rating) / 100.0,
            None => {
                tracing::warn!(response = %text, "Unparseable aesthetic rating; using default");
                DEFAULT_AESTHETIC
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Aesthetic scoring call failed; using default");
            DEFAULT_AESTHETIC
        }
    }
}

// ---------------------------------------------------------------------------
// Color plumbing
// ---------------------------------------------------------------------------

fn palette_labs(palette: &[PaletteColor]) -> Vec<Lab> {
    palette
        .iter()
        .filter_map(|entry| color::hex_to_rgb(&entry.hex).ok())
        .map(color::rgb_to_lab)
        .collect()
}

/// Pull hex strings out of the model's reply. Tolerates both a bare array
/// of strings and an array of `{hex: ...}` objects.
fn hex_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item.as_str()
                        .or_else(|| item.get("hex").and_then(serde_json::Value::as_str))
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Average distance from each extracted color to its nearest locked entry.
/// `None` when no extracted color parses.
fn average_min_delta(extracted: &[String], locked: &[Lab]) -> Option<f64> {
    let mut total = 0.0;
    let mut counted = 0usize;
    for hex in extracted {
        let Ok(rgb) = color::hex_to_rgb(hex) else {
            continue;
        };
        let lab = color::rgb_to_lab(rgb);
        let nearest = locked
            .iter()
            .map(|entry| color::delta_e76(lab, *entry))
            .fold(f64::INFINITY, f64::min);
        if nearest.is_finite() {
            total += nearest;
            counted += 1;
        }
    }
    (counted > 0).then(|| total / counted as f64)
}
