//! Image sources: base64 data URIs and local files.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

/// Load the raw bytes behind an `<img src>`.
///
/// Accepts `data:<mime>;base64,<data>` URIs, `file://` URLs and plain paths.
pub fn load_image_bytes(src: &str) -> Result<Vec<u8>, String> {
    let src = src.trim();
    if src.starts_with("data:") {
        return parse_data_uri(src);
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(format!("remote images are not fetched: {src}"));
    }
    let path = src.strip_prefix("file://").unwrap_or(src);
    fs::read(Path::new(path)).map_err(|e| format!("cannot read image '{path}': {e}"))
}

/// Pixel dimensions of an encoded image.
pub fn intrinsic_size(bytes: &[u8]) -> Option<(u32, u32)> {
    let img = ::image::load_from_memory(bytes).ok()?;
    match (img.width(), img.height()) {
        (0, _) | (_, 0) => None,
        dims => Some(dims),
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let rest = &src["data:".len()..];
    let comma_pos = rest
        .find(',')
        .ok_or_else(|| "invalid data URI: missing `,` separator".to_string())?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}
