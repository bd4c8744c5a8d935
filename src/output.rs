//! CLI output formatting.
//!
//! Pure functions from results to display strings; `main` does the actual
//! printing. Keeping this separate from the procedures keeps them silent
//! and unit-testable.

use crate::imaging::{FileOutcome, OutputFormat};
use crate::types::ConversionResult;

/// Human-readable byte size: `512 B`, `1.5 KB`, `2.3 MB`.
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

/// One-line before/after summary for a conversion.
pub fn size_summary(result: &ConversionResult) -> String {
    let before = human_size(result.size_before);
    let after = human_size(result.size_after);
    if result.size_after < result.size_before {
        let saved = 100 - (result.size_after * 100) / result.size_before.max(1);
        format!("{before} in, {after} out (saved {saved}%)")
    } else {
        // Packing overhead can make an archive slightly larger than the
        // sum of its inputs even though no single file grew.
        format!("{before} in, {after} out")
    }
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Webp => "WEBP",
        OutputFormat::Png => "PNG",
        OutputFormat::Jpeg => "JPEG",
    }
}

/// Per-file report line for an image batch.
pub fn outcome_line(name: &str, outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Reencoded(format) => {
            format!("  {name}: re-encoded as {}", format_label(*format))
        }
        FileOutcome::KeptOriginal => {
            format!("  {name}: kept original (re-encoding would not shrink it)")
        }
        FileOutcome::Failed => format!("  {name}: could not be decoded, stored unmodified"),
    }
}
