//! File writers for hit point data.

use crate::schema::{Schema, HEADER_SIZE, MAGIC};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use trackhit_core::DetectorHitPoint;

/// Encodes points into an in-memory buffer using `schema`.
///
/// # Errors
/// Returns an error if there are more points than the header can count.
pub fn encode_points_with(schema: &Schema, points: &[DetectorHitPoint]) -> Result<Vec<u8>> {
    let count = u32::try_from(points.len()).map_err(|_| {
        Error::InvalidFormat(format!("too many points for one file: {}", points.len()))
    })?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + points.len() * schema.record_size());
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&schema.version.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    for point in points {
        schema.encode_record(point, &mut buf);
    }
    Ok(buf)
}

/// Encodes points with the current schema.
///
/// # Errors
/// Returns an error if there are more points than the header can count.
pub fn encode_points(points: &[DetectorHitPoint]) -> Result<Vec<u8>> {
    encode_points_with(Schema::current(), points)
}

/// Writer for hit point output.
///
/// Writes points as schema-versioned binary, JSON or CSV.
pub struct PointFileWriter {
    writer: BufWriter<File>,
}

impl PointFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes points in the binary format with the current schema.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_points(&mut self, points: &[DetectorHitPoint]) -> Result<()> {
        self.write_points_with(Schema::current(), points)
    }

    /// Writes points in the binary format with an explicit schema.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_points_with(&mut self, schema: &Schema, points: &[DetectorHitPoint]) -> Result<()> {
        let buf = encode_points_with(schema, points)?;
        self.writer.write_all(&buf)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes points as a JSON array.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_points_json(&mut self, points: &[DetectorHitPoint]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, points)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes points as CSV, one column per field of the current schema.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_points_csv(&mut self, points: &[DetectorHitPoint]) -> Result<()> {
        let schema = Schema::current();
        let header: Vec<&str> = schema.fields.iter().map(|f| f.field.name()).collect();
        writeln!(self.writer, "{}", header.join(","))?;

        for point in points {
            let row: Vec<String> = schema
                .fields
                .iter()
                .map(|f| f.field.get(point).to_string())
                .collect();
            writeln!(self.writer, "{}", row.join(","))?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
