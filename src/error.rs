//! Crate-wide error taxonomy.
//!
//! Every user-visible failure mode has its own variant so `main` can print a
//! message matched to what actually went wrong: feeding a PDF to the zip tool
//! is not the same situation as a corrupt archive, and "none of your files
//! were convertible" is calmer news than a processing crash.
//!
//! Per-file failures inside a multi-file batch never surface here; they
//! degrade that one file's outcome (see [`crate::imaging::recompress`]) or
//! drop the file from the batch, unless zero files would succeed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Wrong top-level input type, reported before any processing starts.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The archive could not be opened or parsed: corrupt or not a zip.
    #[error("archive is corrupt or not a supported format: {0}")]
    ArchiveFormat(String),

    /// Batch conversion found nothing matching the rewrite policy.
    #[error("no convertible files found (expected .php or .sql)")]
    NoEligibleFiles,

    /// Every image in a batch failed to decode.
    #[error("no images could be processed")]
    NoImagesProcessed,

    /// A required external collaborator was not available at call time.
    #[error("missing capability: {0}")]
    MissingCapability(String),

    /// The generation endpoint failed or returned unusable data.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
