//! Memory-mapped file readers.
//!

use crate::schema::{Schema, HEADER_SIZE, MAGIC};
use crate::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use trackhit_core::DetectorHitPoint;

/// Parsed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u16,
    pub count: u32,
}

impl FileHeader {
    /// Parses and checks the header at the start of `data`.
    ///
    /// # Errors
    /// Returns an error on truncated input or bad magic.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::InvalidFormat(format!(
                "truncated header: {} bytes, expected {}",
                data.len(),
                HEADER_SIZE
            )));
        }
        if data[0..4] != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad magic {:02x?}",
                &data[0..4]
            )));
        }
        Ok(Self {
            version: u16::from_le_bytes([data[4], data[5]]),
            count: u32::from_le_bytes([data[6], data[7], data[8], data[9]]),
        })
    }

    /// Schema matching this header's version.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedVersion`] for unknown versions.
    pub fn schema(&self) -> Result<&'static Schema> {
        Schema::for_version(self.version).ok_or(Error::UnsupportedVersion(self.version))
    }
}

/// Decodes a complete point buffer, dispatching on its schema version.
///
/// # Errors
/// Returns an error on bad magic, unknown version, or a size that does not
/// match the record count.
pub fn decode_points(data: &[u8]) -> Result<Vec<DetectorHitPoint>> {
    let header = FileHeader::parse(data)?;
    let schema = header.schema()?;
    let record_size = schema.record_size();
    let body = &data[HEADER_SIZE..];

    let expected = header.count as usize * record_size;
    if body.len() != expected {
        return Err(Error::InvalidFormat(format!(
            "{} records of {} bytes need {} bytes, found {}",
            header.count,
            record_size,
            expected,
            body.len()
        )));
    }

    if schema.version != Schema::current().version {
        log::debug!(
            "decoding {} records with schema v{} (current v{})",
            header.count,
            schema.version,
            Schema::current().version
        );
    }

    body.chunks_exact(record_size)
        .map(|record| schema.decode_record(record))
        .collect()
}

/// Reads a JSON array of points.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn read_points_json<P: AsRef<Path>>(path: P) -> Result<Vec<DetectorHitPoint>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// A memory-mapped hit point file.
///
/// Uses memmap2 to access file contents without copying them into
/// memory up front.
pub struct PointFileReader {
    mmap: Mmap,
    path: PathBuf,
    header: FileHeader,
}

impl PointFileReader {
    /// Opens a point file and checks its header.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped, or
    /// if the header is invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        if file.metadata()?.len() < HEADER_SIZE as u64 {
            return Err(Error::InvalidFormat(format!(
                "{} is too small to be a point file",
                path.display()
            )));
        }
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| Error::MmapError(format!("{}: {e}", path.display())))?;
        let header = FileHeader::parse(&mmap)?;
        header.schema()?;
        Ok(Self { mmap, path, header })
    }

    /// Path of the mapped file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version recorded in the header.
    #[must_use]
    pub fn schema_version(&self) -> u16 {
        self.header.version
    }

    /// Number of records announced by the header.
    #[must_use]
    pub fn len(&self) -> usize {
        self.header.count as usize
    }

    /// Returns true if the file holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.count == 0
    }

    /// Returns the raw file contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Decodes all points.
    ///
    /// # Errors
    /// Returns an error if the body does not match the header.
    pub fn read_points(&self) -> Result<Vec<DetectorHitPoint>> {
        decode_points(self.as_bytes())
    }
}
