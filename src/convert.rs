//! The two text-file conversion procedures.
//!
//! [`transcode_archive`] rewrites `.php`/`.sql` entry names inside an
//! existing archive; [`convert_files`] does the same for loose files,
//! producing either one plain file or a fresh archive. Both lean on the
//! [`rename`](crate::rename) policy for the per-name decision and on the
//! [`archive`](crate::archive) boundary for codec work, and both are
//! all-or-nothing: any error means no result object at all.

use crate::archive::{ArchiveCodec, ArchiveEntry};
use crate::error::{Error, Result};
use crate::rename;
use crate::types::{ConversionResult, InputFile};

/// Output name when several loose files are packed together.
pub const PACKED_BATCH_NAME: &str = "converted_files.zip";

/// Rewrite every convertible entry name inside an archive.
///
/// Entries come out in their stored order. Directories pass through as
/// placeholders; file content bytes are never touched, only names change.
/// Stored modification times are preserved (the writer stamps the current
/// time for entries that had none). An empty archive is valid and produces
/// an empty output archive.
pub fn transcode_archive(
    codec: &dyn ArchiveCodec,
    archive_name: &str,
    bytes: &[u8],
) -> Result<ConversionResult> {
    if !has_zip_suffix(archive_name) {
        return Err(Error::UnsupportedInput(format!(
            "{archive_name}: expected a .zip archive"
        )));
    }

    let entries = codec.open(bytes)?;
    let mut writer = codec.writer();
    for entry in &entries {
        if entry.is_dir {
            writer.add(&ArchiveEntry::directory(entry.name.clone()))?;
        } else {
            let decision = rename::decide(&entry.name);
            writer.add(&ArchiveEntry::file(
                decision.new_name,
                entry.data.clone(),
                entry.modified,
            ))?;
        }
    }
    let output = writer.finish()?;

    Ok(ConversionResult {
        size_before: bytes.len() as u64,
        size_after: output.len() as u64,
        output_name: converted_archive_name(archive_name),
        output,
        is_single_artifact: false,
    })
}

/// Convert a batch of loose files.
///
/// Ineligible files are silently dropped. Exactly one eligible file becomes
/// a single artifact under its rewritten name, content verbatim; several
/// become [`PACKED_BATCH_NAME`] with one entry each; zero is
/// [`Error::NoEligibleFiles`].
pub fn convert_files(codec: &dyn ArchiveCodec, files: &[InputFile]) -> Result<ConversionResult> {
    let eligible: Vec<&InputFile> = files
        .iter()
        .filter(|f| rename::is_eligible(&f.name))
        .collect();

    match eligible.as_slice() {
        [] => Err(Error::NoEligibleFiles),
        [only] => Ok(ConversionResult {
            output: only.data.clone(),
            output_name: rename::decide(&only.name).new_name,
            size_before: only.size(),
            size_after: only.size(),
            is_single_artifact: true,
        }),
        many => {
            let mut writer = codec.writer();
            let mut size_before = 0;
            for file in many {
                size_before += file.size();
                writer.add(&ArchiveEntry::file(
                    rename::decide(&file.name).new_name,
                    file.data.clone(),
                    None,
                ))?;
            }
            let output = writer.finish()?;
            Ok(ConversionResult {
                size_before,
                size_after: output.len() as u64,
                output_name: PACKED_BATCH_NAME.to_string(),
                output,
                is_single_artifact: false,
            })
        }
    }
}

fn has_zip_suffix(name: &str) -> bool {
    name.len() >= 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".zip")
}

/// `site.zip` → `site_converted.zip`, matching on the suffix
/// case-insensitively.
fn converted_archive_name(name: &str) -> String {
    debug_assert!(has_zip_suffix(name));
    format!("{}_converted.zip", &name[..name.len() - 4])
}
