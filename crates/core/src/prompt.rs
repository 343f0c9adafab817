//! Prompt synthesis for the image-generation capability.
//!
//! A prompt is assembled from eight numbered sections whose order is a
//! priority contract: the model is told up front that earlier sections win
//! over later ones. Three variants (conservative, standard, bold) share
//! the same template and constraints; a data-driven profile controls only
//! the trend framing, creativity wording, and how many trend items each
//! variant pulls in. Synthesis is deterministic: the same input always
//! produces byte-identical prompts.

use serde::{Deserialize, Serialize};

use crate::color::STRICT_LOCK_MIN;
use crate::style::StyleProfile;

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Proposal variant IDs matching `proposal_variants` seed data (1-based).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Conservative = 1,
    Standard = 2,
    Bold = 3,
}

impl Variant {
    /// All variants in generation order.
    pub const ALL: [Variant; 3] = [Variant::Conservative, Variant::Standard, Variant::Bold];

    /// Return the database variant ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Look up a variant by its database ID.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Conservative),
            2 => Some(Self::Standard),
            3 => Some(Self::Bold),
            _ => None,
        }
    }

    /// Lowercase label matching the seed data.
    pub fn label(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Standard => "standard",
            Self::Bold => "bold",
        }
    }

    /// Parse a lowercase label back into a variant.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "conservative" => Some(Self::Conservative),
            "standard" => Some(Self::Standard),
            "bold" => Some(Self::Bold),
            _ => None,
        }
    }

    /// The wording profile driving this variant's prompt.
    pub fn profile(self) -> &'static VariantProfile {
        // ALL and VARIANT_PROFILES share indexing by construction,
        // pinned by the profiles_align_with_variants test.
        &VARIANT_PROFILES[self.id() as usize - 1]
    }
}

/// Per-variant wording knobs. One template, three parameterisations.
pub struct VariantProfile {
    pub variant: Variant,
    pub label: &'static str,
    /// Creativity framing appended to the trend section.
    pub creativity: &'static str,
    /// How the trend items are introduced.
    pub trend_framing: &'static str,
    /// How many trend keywords/techniques this variant pulls in.
    pub trend_items: usize,
}

/// Wording profiles for the three variants.
pub const VARIANT_PROFILES: &[VariantProfile] = &[
    VariantProfile {
        variant: Variant::Conservative,
        label: "conservative",
        creativity: "Keep the design safe and proven.",
        trend_framing: "a refined, classic interpretation of",
        trend_items: 2,
    },
    VariantProfile {
        variant: Variant::Standard,
        label: "standard",
        creativity: "Balance familiarity with fresh touches.",
        trend_framing: "a modern, romantic take on",
        trend_items: 3,
    },
    VariantProfile {
        variant: Variant::Bold,
        label: "bold",
        creativity: "Push creative boundaries while keeping the cake physically plausible.",
        trend_framing: "an avant-garde, statement-making expression of",
        trend_items: 5,
    },
];

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// Everything the synthesizer needs, already loaded and filtered.
pub struct PromptInput<'a> {
    pub style: &'a StyleProfile,
    /// Customer brief after forbidden-term filtering; `None` when blank.
    pub brief: Option<&'a str>,
    pub tier_count: i16,
    pub shape: &'a str,
    pub layout_description: &'a str,
    /// Active reality rules feeding the negative prompt.
    pub reality_rules: &'a [String],
}

/// One synthesized prompt pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPrompt {
    pub variant: Variant,
    pub prompt: String,
    pub negative_prompt: String,
}

/// Fixed exclusions present in every negative prompt.
pub const BASE_NEGATIVE_PROMPT: &str = "blurry, low quality, deformed, distorted proportions, \
     watermark, text, logo, signature, cropped cake, floating decorations";

const PRIORITY_PREAMBLE: &str = "Professional cake design specification. Instructions are \
     ordered by priority: when two instructions conflict, the earlier instruction wins.";

// ---------------------------------------------------------------------------
// Section builders
// ---------------------------------------------------------------------------

/// Qualitative wording for a `[0, 1]` knob, banded at 0.8 and 0.5.
fn band(value: f64, high: &'static str, mid: &'static str, low: &'static str) -> &'static str {
    if value > 0.8 {
        high
    } else if value > 0.5 {
        mid
    } else {
        low
    }
}

fn format_palette(style: &StyleProfile) -> String {
    style
        .palette
        .iter()
        .map(|c| format!("{} ({:.0}%)", c.hex, c.ratio * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

fn section_signature_style(style: &StyleProfile) -> String {
    // Aggregate the per-reference analyses into one signature summary.
    let mut palette: Vec<String> = Vec::new();
    for reference in &style.references {
        for color in &reference.palette {
            if !palette
                .iter()
                .any(|seen| seen.starts_with(&color.hex))
            {
                palette.push(format!("{} ({:.0}%)", color.hex, color.ratio * 100.0));
            }
        }
    }
    palette.truncate(8);

    let palette_text = if palette.is_empty() {
        "as locked below".to_string()
    } else {
        palette.join(", ")
    };
    let textures = style.reference_texture_tags();
    let texture_text = if textures.is_empty() {
        "smooth finish".to_string()
    } else {
        textures.join(", ")
    };

    format!(
        "1. SIGNATURE STYLE (from reference analysis): dominant palette {palette_text}; \
         surface textures: {texture_text}; decoration density: {}.",
        style.average_reference_density().label()
    )
}

fn section_style_fidelity(style: &StyleProfile) -> String {
    let intensity = &style.intensity;
    format!(
        "2. STYLE FIDELITY: {} Render with {}, {}, {}, and {}.",
        band(
            intensity.style_strength,
            "Stay extremely close to the reference images, minimal deviation.",
            "Follow the reference style closely while allowing moderate variation.",
            "Use the references as loose inspiration.",
        ),
        band(
            intensity.sharpness,
            "crisp, clearly defined edges and piping",
            "balanced edge definition",
            "soft, rounded edges and gentle transitions",
        ),
        band(
            intensity.realism,
            "photorealistic rendering",
            "semi-realistic rendering",
            "stylized, illustrative rendering",
        ),
        band(
            intensity.complexity,
            "rich, layered detail",
            "moderate detail",
            "restrained, minimal detail",
        ),
        band(
            intensity.uniformity,
            "strictly consistent, symmetrical decoration",
            "mostly consistent decoration",
            "freeform, asymmetrical decoration allowed",
        ),
    )
}

fn section_structure(input: &PromptInput) -> String {
    format!(
        "3. STRUCTURE (fixed, not subject to customer preferences): {}-tier {} cake. {}",
        input.tier_count, input.shape, input.layout_description
    )
}

fn section_palette(style: &StyleProfile) -> String {
    let palette_text = format_palette(style);
    if style.palette.is_empty() {
        "4. COLOR PALETTE: decorator's choice, harmonious with the signature style.".to_string()
    } else if style.palette_lock_strength >= STRICT_LOCK_MIN {
        format!(
            "4. COLOR PALETTE (strict lock): use EXACTLY these colors and no others, in these \
             proportions: {palette_text}."
        )
    } else {
        format!("4. COLOR PALETTE (inspirational): draw color inspiration from: {palette_text}.")
    }
}

fn section_decorations(style: &StyleProfile) -> String {
    if style.allowed_decorations.is_empty() {
        "5. DECORATION ELEMENTS: decorator's choice within the signature style.".to_string()
    } else {
        format!(
            "5. DECORATION ELEMENTS: work only with: {}.",
            style.allowed_decorations.join(", ")
        )
    }
}

fn section_trends(style: &StyleProfile, profile: &VariantProfile) -> String {
    let items: Vec<&str> = style
        .trend_keywords
        .iter()
        .chain(style.trend_techniques.iter())
        .map(String::as_str)
        .take(profile.trend_items)
        .collect();

    if items.is_empty() {
        format!(
            "6. TREND DIRECTION: timeless styling, no seasonal trends. {}",
            profile.creativity
        )
    } else {
        format!(
            "6. TREND DIRECTION: {} {}. {}",
            profile.trend_framing,
            items.join(", "),
            profile.creativity
        )
    }
}

fn section_brief(brief: Option<&str>) -> String {
    match brief {
        Some(text) if !text.trim().is_empty() => format!(
            "7. CUSTOMER INSPIRATION (blend, do not override): \"{text}\". Treat this as \
             inspiration to blend into the signature style; if any customer color or \
             structure preference conflicts with sections 1-6, ignore it in favor of the \
             style pack."
        ),
        _ => "7. CUSTOMER INSPIRATION: none provided; rely on the signature style.".to_string(),
    }
}

const SECTION_PRESENTATION: &str = "8. PRESENTATION: professional food photography, studio \
     softbox lighting, centered composition on a neutral seamless background, the full cake \
     in frame. No text, no logos, no watermarks, no human hands. Avoid dated styling: no \
     pillar columns between tiers, no plastic figurines, no airbrushed gradients.";

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Concatenate the fixed base exclusions, the active reality rules, and the
/// pack's banned terms into the shared negative prompt.
pub fn build_negative_prompt(reality_rules: &[String], banned_terms: &[String]) -> String {
    let mut parts: Vec<&str> = vec![BASE_NEGATIVE_PROMPT];
    parts.extend(reality_rules.iter().map(String::as_str).filter(|r| !r.is_empty()));
    parts.extend(banned_terms.iter().map(String::as_str).filter(|t| !t.is_empty()));
    parts.join(", ")
}

/// Build the three variant prompts for one request.
pub fn synthesize(input: &PromptInput) -> Vec<VariantPrompt> {
    let negative_prompt = build_negative_prompt(input.reality_rules, &input.style.banned_terms);

    let shared_sections = [
        section_signature_style(input.style),
        section_style_fidelity(input.style),
        section_structure(input),
        section_palette(input.style),
        section_decorations(input.style),
    ];
    let tail_sections = [section_brief(input.brief), SECTION_PRESENTATION.to_string()];

    Variant::ALL
        .iter()
        .map(|&variant| {
            let mut sections: Vec<String> = Vec::with_capacity(9);
            sections.push(PRIORITY_PREAMBLE.to_string());
            sections.extend(shared_sections.iter().cloned());
            sections.push(section_trends(input.style, variant.profile()));
            sections.extend(tail_sections.iter().cloned());

            VariantPrompt {
                variant,
                prompt: sections.join("\n\n"),
                negative_prompt: negative_prompt.clone(),
            }
        })
        .collect()
}
