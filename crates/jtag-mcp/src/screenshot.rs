// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::imageops::FilterType;

const MAX_WIDTH: u32 = 1200;
const MAX_HEIGHT: u32 = 800;
const JPEG_QUALITY: u8 = 70;

/// A reply whose payload names a `path` ending in an image extension gets
/// its image resized to fit 1200x800 and returned alongside the text
/// block, base64-encoded. Uses the `image` crate, the same one
/// `airs-mcpserver-fs` carries for its own attachment handling.
pub fn is_image_path(path: &str) -> bool {
    matches!(
        Path::new(path).extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase()).as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif" | "webp")
    )
}

pub fn resize_to_jpeg_base64(path: &Path) -> anyhow::Result<String> {
    let img = image::open(path)?;
    let resized = img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3);

    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    resized.write_with_encoder(encoder)?;

    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
#[path = "screenshot_tests.rs"]
mod tests;
