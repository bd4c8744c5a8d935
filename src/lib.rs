//! # devbox
//!
//! A batch file-conversion toolbox. Three converters and one AI helper,
//! each a synchronous procedure from input files to exactly one output
//! artifact:
//!
//! ```text
//! zip      archive.zip      →  archive_converted.zip   (.php/.sql → .txt inside)
//! convert  loose files      →  one .txt, or converted_files.zip
//! images   image files      →  one image, or compressed_images.zip
//! prompt   one image        →  English prompt + Arabic explanation
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`rename`] | The `.php`/`.sql` → `.txt` rewrite policy every converter shares |
//! | [`archive`] | Archive codec boundary (`ArchiveCodec` trait) and the zip implementation |
//! | [`convert`] | Archive transcoding and loose-file batch conversion |
//! | [`imaging`] | Image codec boundary and the smaller-wins recompression procedure |
//! | [`prompt`] | Generative endpoint boundary and the derive/refine prompt session |
//! | [`types`] | `InputFile` and `ConversionResult`, shared by all converters |
//! | [`error`] | Crate-wide error taxonomy |
//! | [`output`] | CLI display formatting for results |
//!
//! # Design Decisions
//!
//! ## Capabilities Are Injected
//!
//! The procedures never reach for a concrete codec or HTTP client. Each
//! external collaborator (archive codec, image codec, generation endpoint)
//! is a narrow trait passed in by the caller, so tests substitute recording
//! fakes and the policy code stays library-agnostic.
//!
//! ## Sequential By Contract
//!
//! Per-file work inside a batch is deliberately sequential: archive entry
//! order must be deterministic, and the archive writer is exclusively owned
//! by the one in-progress procedure call. There is no parallel fan-out to
//! coordinate and no shared mutable state between operations.
//!
//! ## All-Or-Nothing Results
//!
//! A procedure returns a complete [`types::ConversionResult`] or an error,
//! never a partial artifact. Per-file trouble inside a batch degrades that
//! file (stored unmodified, or dropped where the policy says so) instead of
//! aborting the batch, unless zero files would succeed, which fails the
//! whole operation.
//!
//! ## Never Larger Than The Input
//!
//! Image recompression keeps whichever of {original, re-encoded} is
//! smaller, per file. The tool can fail to shrink an image; it cannot grow
//! one.

pub mod archive;
pub mod convert;
pub mod error;
pub mod imaging;
pub mod output;
pub mod prompt;
pub mod rename;
pub mod types;
