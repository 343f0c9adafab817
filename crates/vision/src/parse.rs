//! Tolerant parsing of model-produced JSON.
//!
//! The analysis and scoring calls ask the model to answer in JSON, but the
//! shape is a convention the model follows, not a contract it guarantees.
//! Models routinely wrap the payload in Markdown code fences or prepend
//! prose. Every parse here returns a tagged result; callers apply their
//! documented fallback on failure instead of propagating a panic.

use crate::error::VisionError;

/// Strip a Markdown code fence (```json ... ``` or ``` ... ```) wrapping
/// the payload, if present. Returns the inner text trimmed; text without a
/// fence passes through trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line.
    match rest.split_once('\n') {
        Some((_lang, body)) => body.trim(),
        None => rest.trim(),
    }
}

/// Parse model output as JSON, tolerating code fences and surrounding
/// prose. Tries the fence-stripped text first, then falls back to the
/// first `{...}` or `[...]` span found in it.
pub fn lenient_json(text: &str) -> Result<serde_json::Value, VisionError> {
    let candidate = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    if let Some(span) = json_span(candidate) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }

    Err(VisionError::Parse(format!(
        "no JSON found in response: {}",
        truncate(text, 120)
    )))
}

/// The span from the first `{` or `[` to the matching last `}` or `]`.
fn json_span(text: &str) -> Option<&str> {
    let open = text.find(['{', '['])?;
    let close_char = if text.as_bytes()[open] == b'{' { '}' } else { ']' };
    let close = text.rfind(close_char)?;
    if close <= open {
        return None;
    }
    Some(&text[open..=close])
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
