//! Shapefile reader facade.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::geometry::{BoundingBox, ShapeType};

use super::bytes::ByteReader;
use super::dbf::{DbfFile, FieldDefinition};
use super::record::ShapeRecord;
use super::shp::{self, MainFileHeader};
use super::ShapefileError;

/// Reader over one logical shapefile (`base.shp` + `base.shx` + `base.dbf`).
///
/// `base.shp` and `base.shx` are required; `base.dbf` is optional, and
/// without it records carry empty attribute maps. All headers are parsed
/// during [`open`](Self::open); malformed headers fail the open, while a
/// malformed individual record only fails that record.
#[derive(Debug)]
pub struct ShapefileReader {
    base: PathBuf,
    shp: ByteReader<BufReader<File>>,
    shx: ByteReader<BufReader<File>>,
    dbf: Option<DbfFile<BufReader<File>>>,
    header: MainFileHeader,
    record_count: u32,
}

impl ShapefileReader {
    /// Open a shapefile by its base path (no extension).
    pub fn open<P: AsRef<Path>>(base: P) -> Result<Self, ShapefileError> {
        let base = base.as_ref().to_path_buf();

        let mut shp = ByteReader::new(BufReader::new(File::open(base.with_extension("shp"))?));
        let mut shx = ByteReader::new(BufReader::new(File::open(base.with_extension("shx"))?));
        let dbf = match File::open(base.with_extension("dbf")) {
            Ok(file) => Some(DbfFile::open(BufReader::new(file))?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(ShapefileError::Io(e)),
        };

        let header = shp::read_main_header(&mut shp)?;
        let shx_header = shp::read_main_header(&mut shx)?;

        // The DBF's count is authoritative when present; otherwise derive
        // it from the index file length.
        let record_count = match &dbf {
            Some(dbf) => dbf.record_count(),
            None => shp::shx_record_count(shx_header.file_length_bytes()),
        };

        tracing::debug!(
            base = %base.display(),
            shape_type = %header.shape_type,
            records = record_count,
            "opened shapefile"
        );

        Ok(Self {
            base,
            shp,
            shx,
            dbf,
            header,
            record_count,
        })
    }

    /// Number of records, from the DBF when present, else from the SHX.
    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    /// The file-level dominant shape type.
    pub fn shape_type(&self) -> ShapeType {
        self.header.shape_type
    }

    /// Overall bounding box from the main header.
    pub fn bounds(&self) -> BoundingBox {
        self.header.bounds
    }

    /// Attribute columns, empty when no `.dbf` accompanies the shapefile.
    pub fn field_definitions(&self) -> &[FieldDefinition] {
        self.dbf.as_ref().map(|d| d.fields()).unwrap_or(&[])
    }

    /// Read record `index` (0-based).
    ///
    /// Returns `Ok(None)` when the DBF marks the record deleted. An index
    /// at or past [`record_count`](Self::record_count) is an
    /// [`OutOfRange`](ShapefileError::OutOfRange) error.
    pub fn read_record(&mut self, index: u32) -> Result<Option<ShapeRecord>, ShapefileError> {
        if index >= self.record_count {
            return Err(ShapefileError::OutOfRange {
                index,
                count: self.record_count,
            });
        }

        let (offset, _length) = shp::read_shx_entry(&mut self.shx, index)?;
        let (record_number, geometry) = shp::read_geometry_record(&mut self.shp, offset)?;

        let attributes = match &mut self.dbf {
            Some(dbf) => match dbf.read_record(index)? {
                Some(attributes) => attributes,
                None => return Ok(None), // deleted
            },
            None => Default::default(),
        };

        Ok(Some(ShapeRecord {
            record_number,
            geometry,
            attributes,
        }))
    }

    /// Read every record, skipping deleted and malformed ones.
    pub fn read_all_records(&mut self) -> Vec<ShapeRecord> {
        let mut records = Vec::with_capacity(self.record_count as usize);
        for index in 0..self.record_count {
            match self.read_record(index) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping unreadable record");
                }
            }
        }
        records
    }

    /// Read the records whose geometry bounds intersect `bbox`.
    ///
    /// This is the un-indexed path: a full scan with a bbox filter. Callers
    /// that query repeatedly should build a spatial index instead.
    pub fn read_records_in_bounds(&mut self, bbox: &BoundingBox) -> Vec<ShapeRecord> {
        self.read_all_records()
            .into_iter()
            .filter(|record| record.bounds().intersects(bbox))
            .collect()
    }

    /// Header-level summary for display.
    pub fn info(&self) -> ShapefileInfo {
        ShapefileInfo {
            base: self.base.display().to_string(),
            shape_type: self.header.shape_type,
            record_count: self.record_count,
            bounds: self.header.bounds,
            fields: self.field_definitions().to_vec(),
        }
    }
}

/// Printable shapefile metadata.
#[derive(Debug, Clone)]
pub struct ShapefileInfo {
    pub base: String,
    pub shape_type: ShapeType,
    pub record_count: u32,
    pub bounds: BoundingBox,
    pub fields: Vec<FieldDefinition>,
}

impl fmt::Display for ShapefileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shapefile Information:")?;
        writeln!(f, "  File: {}", self.base)?;
        writeln!(f, "  Shape Type: {}", self.shape_type)?;
        writeln!(f, "  Record Count: {}", self.record_count)?;
        writeln!(f, "  Bounds: {}", self.bounds)?;
        if !self.fields.is_empty() {
            writeln!(f, "  Fields:")?;
            for field in &self.fields {
                writeln!(
                    f,
                    "    {} ({}, {})",
                    field.name, field.field_type, field.length
                )?;
            }
        }
        Ok(())
    }
}
