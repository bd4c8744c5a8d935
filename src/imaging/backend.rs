//! Image codec trait and shared types.
//!
//! The recompression procedure needs exactly one operation from a codec:
//! decode a buffer and re-encode it, at its own pixel dimensions, in a
//! concrete output format. Keeping the trait that narrow decouples the
//! procedure from the `image` crate's full surface and makes the mock
//! trivial.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Concrete output encoding. "Keep original" is resolved to one of these
/// before any codec is touched; see [`Target`](super::Target).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Webp,
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Extension used when an artifact is renamed to this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Lossy encoder quality, 0–100.
///
/// Defaults to 80, the tool's fixed setting. PNG and the lossless WebP
/// encoder ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Trait for image codecs.
pub trait ImageCodec {
    /// Decode `bytes` and re-encode the raster at its original dimensions.
    fn reencode(
        &self,
        bytes: &[u8],
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;
}
