//! Data-URL helpers for generated image payloads.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Wrap raw PNG bytes in a `data:image/png;base64,...` URL.
pub fn encode_png(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Wrap an already-base64-encoded PNG payload in a data URL.
pub fn from_png_base64(b64: &str) -> String {
    format!("data:image/png;base64,{b64}")
}

/// Decode the base64 payload of a data URL. Returns `None` when the input
/// is not a base64 data URL or the payload does not decode.
pub fn decode(data_url: &str) -> Option<Vec<u8>> {
    let (_, payload) = data_url.split_once("base64,")?;
    STANDARD.decode(payload.trim()).ok()
}

/// Read the pixel dimensions of a data-URL image from its header, without
/// decoding the full bitmap. `None` when the payload is not a readable
/// image.
pub fn decode_dimensions(data_url: &str) -> Option<(u32, u32)> {
    let bytes = decode(data_url)?;
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    reader.into_dimensions().ok()
}
