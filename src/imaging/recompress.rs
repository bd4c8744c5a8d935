//! The image recompression procedure.
//!
//! Each file is decoded and re-encoded in a concrete target format, then
//! whichever of {original bytes, encoded bytes} is smaller wins; the tool
//! never emits an artifact larger than its input. When the original wins,
//! its name and extension stay too.
//!
//! One file is a single artifact; several are packed into an archive. In
//! the packed case a file that fails to decode degrades to being stored
//! unmodified instead of aborting the batch, unless every file fails.
//!
//! Per-file states run `Pending → Decoded → Encoded` and terminate in one
//! of the [`FileOutcome`] variants; `Failed` is only reachable in the
//! packed path, where it means "stored as-is".

use super::backend::{ImageCodec, OutputFormat, Quality};
use crate::archive::{ArchiveCodec, ArchiveEntry};
use crate::error::{Error, Result};
use crate::types::{ConversionResult, InputFile};
use std::path::Path;

/// Output name when several images are packed together.
pub const PACKED_IMAGES_NAME: &str = "compressed_images.zip";

/// Requested output encoding, straight from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Defer to the source file's own extension.
    #[default]
    KeepOriginal,
    Webp,
    Png,
    Jpeg,
}

impl Target {
    /// Resolve to a concrete encoding for one file.
    ///
    /// Keep-original maps png→PNG and jpg/jpeg→JPEG; anything else (GIF,
    /// BMP, WebP, …) falls back to PNG to preserve transparency.
    pub fn resolve(self, file_name: &str) -> OutputFormat {
        match self {
            Target::Webp => OutputFormat::Webp,
            Target::Png => OutputFormat::Png,
            Target::Jpeg => OutputFormat::Jpeg,
            Target::KeepOriginal => {
                let ext = Path::new(file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase);
                match ext.as_deref() {
                    Some("png") => OutputFormat::Png,
                    Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
                    _ => OutputFormat::Png,
                }
            }
        }
    }
}

/// Terminal state of one file in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Re-encoding won the size comparison; artifact renamed to the format.
    Reencoded(OutputFormat),
    /// The original was at least as small; bytes and name untouched.
    KeptOriginal,
    /// Decode/encode failed; original stored unmodified (packed path only).
    Failed,
}

/// The conversion artifact plus what happened to each file.
#[derive(Debug)]
pub struct RecompressReport {
    pub result: ConversionResult,
    /// One `(input name, outcome)` pair per file, in input order.
    pub outcomes: Vec<(String, FileOutcome)>,
}

/// Recompress a batch of images into one artifact.
pub fn recompress(
    codec: &dyn ImageCodec,
    archive: &dyn ArchiveCodec,
    files: &[InputFile],
    target: Target,
    quality: Quality,
) -> Result<RecompressReport> {
    match files {
        [] => Err(Error::NoImagesProcessed),
        [single] => recompress_single(codec, single, target, quality),
        many => recompress_packed(codec, archive, many, target, quality),
    }
}

fn recompress_single(
    codec: &dyn ImageCodec,
    file: &InputFile,
    target: Target,
    quality: Quality,
) -> Result<RecompressReport> {
    let format = target.resolve(&file.name);
    let encoded = match codec.reencode(&file.data, format, quality) {
        // An empty buffer is an encoder malfunction, not a zero-byte win.
        Ok(encoded) if !encoded.is_empty() => encoded,
        _ => return Err(Error::NoImagesProcessed),
    };

    let (output, output_name, outcome) = pick_winner(file, encoded, format);
    let size_after = output.len() as u64;
    Ok(RecompressReport {
        result: ConversionResult {
            output,
            output_name,
            size_before: file.size(),
            size_after,
            is_single_artifact: true,
        },
        outcomes: vec![(file.name.clone(), outcome)],
    })
}

fn recompress_packed(
    codec: &dyn ImageCodec,
    archive: &dyn ArchiveCodec,
    files: &[InputFile],
    target: Target,
    quality: Quality,
) -> Result<RecompressReport> {
    let mut writer = archive.writer();
    let mut outcomes = Vec::with_capacity(files.len());
    let mut size_before = 0;
    let mut processed = 0usize;

    for file in files {
        size_before += file.size();
        let format = target.resolve(&file.name);
        match codec.reencode(&file.data, format, quality) {
            Ok(encoded) if !encoded.is_empty() => {
                processed += 1;
                let (bytes, name, outcome) = pick_winner(file, encoded, format);
                writer.add(&ArchiveEntry::file(name, bytes, None))?;
                outcomes.push((file.name.clone(), outcome));
            }
            // Decode/encode failure, or an empty buffer from a
            // malfunctioning encoder: this file travels unmodified.
            _ => {
                writer.add(&ArchiveEntry::file(
                    file.name.clone(),
                    file.data.clone(),
                    None,
                ))?;
                outcomes.push((file.name.clone(), FileOutcome::Failed));
            }
        }
    }

    if processed == 0 {
        return Err(Error::NoImagesProcessed);
    }

    let output = writer.finish()?;
    Ok(RecompressReport {
        result: ConversionResult {
            size_before,
            size_after: output.len() as u64,
            output_name: PACKED_IMAGES_NAME.to_string(),
            output,
            is_single_artifact: false,
        },
        outcomes,
    })
}

/// The core space-saving rule: strictly smaller wins, ties keep the
/// original (and with it, its name).
fn pick_winner(
    file: &InputFile,
    encoded: Vec<u8>,
    format: OutputFormat,
) -> (Vec<u8>, String, FileOutcome) {
    if encoded.len() as u64 >= file.size() {
        (
            file.data.clone(),
            file.name.clone(),
            FileOutcome::KeptOriginal,
        )
    } else {
        (
            encoded,
            swap_extension(&file.name, format.extension()),
            FileOutcome::Reencoded(format),
        )
    }
}

fn swap_extension(name: &str, ext: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 => format!("{}.{ext}", &name[..pos]),
        // Dotless names (and dotfiles like ".png") keep the whole name.
        _ => format!("{name}.{ext}"),
    }
}
