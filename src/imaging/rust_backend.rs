//! Production codec over the `image` crate, everything statically linked.
//!
//! WebP output uses the crate's lossless encoder: the pure-Rust WebP encoder
//! has no lossy mode, and we don't link C codec libraries. The [`Quality`]
//! setting therefore applies to JPEG output only; the caller's smaller-wins
//! comparison keeps oversized results out regardless of encoder.
//!
//! Animated GIF input decodes to its first frame, the same raster a canvas
//! `drawImage` would have produced.

use super::backend::{CodecError, ImageCodec, OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Extensions whose decoders are compiled in and known to work.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// The set of image file extensions this codec can decode.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Whether a file name looks like a decodable image.
pub fn is_supported_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| e.eq_ignore_ascii_case(s))
        })
}

/// Pure Rust codec using the `image` crate.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for RustCodec {
    fn reencode(
        &self,
        bytes: &[u8],
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let img = image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;

        let mut out = Cursor::new(Vec::new());
        match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel; flatten first.
                let rgb = img.to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.value());
                encoder
                    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(|e| CodecError::Encode(e.to_string()))?;
            }
            OutputFormat::Png => {
                img.write_to(&mut out, ImageFormat::Png)
                    .map_err(|e| CodecError::Encode(e.to_string()))?;
            }
            OutputFormat::Webp => {
                let rgba = img.to_rgba8();
                let encoder = WebPEncoder::new_lossless(&mut out);
                encoder
                    .encode(
                        rgba.as_raw(),
                        rgba.width(),
                        rgba.height(),
                        ExtendedColorType::Rgba8,
                    )
                    .map_err(|e| CodecError::Encode(e.to_string()))?;
            }
        }
        Ok(out.into_inner())
    }
}
