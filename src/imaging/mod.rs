//! Image recompression, in pure Rust with no linked codec libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, WebP, GIF, BMP) | `image::load_from_memory` |
//! | **Encode → JPEG** | `JpegEncoder::new_with_quality` |
//! | **Encode → PNG** | `image` PNG encoder (lossless) |
//! | **Encode → WebP** | `WebPEncoder::new_lossless` |
//!
//! The module is split into:
//! - **Backend**: [`ImageCodec`] trait, [`OutputFormat`], [`Quality`]
//! - **RustCodec**: the production `image`-crate implementation
//! - **Recompress**: the smaller-wins batch procedure

pub mod backend;
pub mod recompress;
pub mod rust_backend;

pub use backend::{CodecError, ImageCodec, OutputFormat, Quality};
pub use recompress::{FileOutcome, PACKED_IMAGES_NAME, RecompressReport, Target, recompress};
pub use rust_backend::{RustCodec, is_supported_image, supported_input_extensions};
