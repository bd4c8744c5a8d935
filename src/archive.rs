//! Archive codec boundary.
//!
//! The conversion procedures never touch the `zip` crate directly. They see
//! two narrow capabilities (open an archive into entries, and write entries
//! into a new archive), so tests can substitute a recording fake and the
//! concrete codec can change without touching policy code.
//!
//! Everything is in-memory: an archive is `&[u8]` in and `Vec<u8>` out.
//! The inputs this tool handles are user uploads, not multi-gigabyte
//! backups, so buffering whole entries is the simple and correct trade.

use crate::error::{Error, Result};
use std::io::{Cursor, Read, Write};
use time::OffsetDateTime;
use zip::write::FileOptions;
use zip::{DateTime, ZipArchive, ZipWriter};

/// One unit inside an archive: a file with content, or a directory
/// placeholder with none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
    /// Stored modification time, when the source archive had one.
    pub modified: Option<OffsetDateTime>,
    /// Always empty for directories.
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn file(name: impl Into<String>, data: Vec<u8>, modified: Option<OffsetDateTime>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            modified,
            data,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            modified: None,
            data: Vec::new(),
        }
    }
}

/// Capability to parse an existing archive and to start writing a new one.
pub trait ArchiveCodec {
    /// Parse `bytes` into entries, in the archive's stored order.
    ///
    /// A buffer that is not a readable archive is [`Error::ArchiveFormat`].
    fn open(&self, bytes: &[u8]) -> Result<Vec<ArchiveEntry>>;

    /// Begin a new archive.
    fn writer(&self) -> Box<dyn ArchiveWriter>;
}

/// Write half of the codec boundary. Exclusively owned by one procedure
/// call for its whole lifetime; entries land in the order `add` is called.
pub trait ArchiveWriter {
    /// Append one entry. Entries without a modification time are stamped
    /// with the current time.
    fn add(&mut self, entry: &ArchiveEntry) -> Result<()>;

    /// Finalize and return the complete archive buffer.
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Production codec backed by the `zip` crate.
pub struct ZipCodec;

impl ZipCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveCodec for ZipCodec {
    fn open(&self, bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ArchiveFormat(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ArchiveFormat(e.to_string()))?;

            if file.is_dir() {
                entries.push(ArchiveEntry::directory(file.name()));
                continue;
            }

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ArchiveFormat(e.to_string()))?;
            let modified = file.last_modified().to_time().ok();
            entries.push(ArchiveEntry::file(file.name(), data, modified));
        }
        Ok(entries)
    }

    fn writer(&self) -> Box<dyn ArchiveWriter> {
        Box::new(ZipBufferWriter {
            inner: ZipWriter::new(Cursor::new(Vec::new())),
        })
    }
}

struct ZipBufferWriter {
    inner: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBufferWriter {
    fn options_for(entry: &ArchiveEntry) -> FileOptions {
        let stamp = entry.modified.unwrap_or_else(OffsetDateTime::now_utc);
        let mut options = FileOptions::default();
        // DOS timestamps only cover 1980..=2107 at 2-second resolution;
        // out-of-range stamps fall back to the zip crate's default.
        if let Ok(dt) = DateTime::try_from(stamp) {
            options = options.last_modified_time(dt);
        }
        options
    }
}

impl ArchiveWriter for ZipBufferWriter {
    fn add(&mut self, entry: &ArchiveEntry) -> Result<()> {
        let options = Self::options_for(entry);
        if entry.is_dir {
            self.inner
                .add_directory(entry.name.as_str(), options)
                .map_err(|e| Error::ArchiveFormat(e.to_string()))?;
        } else {
            self.inner
                .start_file(entry.name.as_str(), options)
                .map_err(|e| Error::ArchiveFormat(e.to_string()))?;
            self.inner.write_all(&entry.data)?;
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        let cursor = self
            .inner
            .finish()
            .map_err(|e| Error::ArchiveFormat(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
