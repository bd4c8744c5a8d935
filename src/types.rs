//! Shared types used across the conversion procedures.
//!
//! Every tool (archive transcoding, batch conversion, image recompression)
//! consumes [`InputFile`]s and produces exactly one [`ConversionResult`],
//! which `main` writes to disk and `output` summarizes.

/// One standalone input file, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Bare file name (no directory components for loose files).
    pub name: String,
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// The single artifact a conversion produces.
///
/// Immutable once built; a procedure either returns a complete result or an
/// error, never a partial one.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub output: Vec<u8>,
    /// Suggested file name for the artifact.
    pub output_name: String,
    /// Total size of the inputs that contributed to the artifact.
    pub size_before: u64,
    /// Size of the artifact itself.
    pub size_after: u64,
    /// True when the output is one plain file rather than an archive.
    pub is_single_artifact: bool,
}
