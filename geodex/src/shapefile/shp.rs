//! `.shp` / `.shx` binary decoding.
//!
//! Both files open with the same 100-byte main header. The `.shx` body is
//! an array of 8-byte `(offset, length)` entries, both in 16-bit words, so
//! record `i`'s geometry lives at a byte offset computable in O(1). Record
//! framing (record number, content length) is big-endian; the geometry
//! payloads are little-endian.

use std::io::{Read, Seek};

use crate::geometry::{BoundingBox, Geometry, Point, ShapeType};

use super::bytes::ByteReader;
use super::ShapefileError;

/// Magic number in the first four bytes of `.shp` and `.shx` files.
pub const SHP_FILE_CODE: i32 = 9994;
/// Size of the main file header in bytes.
pub const SHP_HEADER_LEN: u64 = 100;

/// Fixed part of a record's content: shape type code.
const RECORD_TYPE_LEN: u64 = 4;
/// Poly record prelude after the type code: bbox + num_parts + num_points.
const POLY_PRELUDE_LEN: u64 = 32 + 4 + 4;

/// Decoded 100-byte main file header, shared by `.shp` and `.shx`.
#[derive(Debug, Clone)]
pub struct MainFileHeader {
    /// Total file length in 16-bit words, header included.
    pub file_length_words: i32,
    pub version: i32,
    /// The file's dominant shape type; individual records may still be null.
    pub shape_type: ShapeType,
    pub bounds: BoundingBox,
}

impl MainFileHeader {
    /// File length in bytes.
    pub fn file_length_bytes(&self) -> u64 {
        self.file_length_words as u64 * 2
    }
}

/// Parse the main header from the start of the source.
pub fn read_main_header<R: Read + Seek>(
    reader: &mut ByteReader<R>,
) -> Result<MainFileHeader, ShapefileError> {
    reader.seek_to(0)?;

    let file_code = reader.read_i32_be()?;
    if file_code != SHP_FILE_CODE {
        return Err(ShapefileError::MalformedShp(format!(
            "bad file code {} (expected {})",
            file_code, SHP_FILE_CODE
        )));
    }

    reader.skip(20)?; // five unused i32s
    let file_length_words = reader.read_i32_be()?;
    if file_length_words < 50 {
        return Err(ShapefileError::MalformedShp(format!(
            "file length {} words is shorter than the header",
            file_length_words
        )));
    }
    let version = reader.read_i32_le()?;

    let type_code = reader.read_i32_le()?;
    let shape_type = ShapeType::from_code(type_code).ok_or_else(|| {
        ShapefileError::MalformedShp(format!("unknown shape type code {}", type_code))
    })?;

    let bounds = BoundingBox::new(
        reader.read_f64_le()?,
        reader.read_f64_le()?,
        reader.read_f64_le()?,
        reader.read_f64_le()?,
    );
    reader.skip(32)?; // Z and M ranges

    Ok(MainFileHeader {
        file_length_words,
        version,
        shape_type,
        bounds,
    })
}

/// Read index entry `index` from an open `.shx` source.
///
/// Returns the record's `(byte offset, byte length)` in the `.shp` file.
pub fn read_shx_entry<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    index: u32,
) -> Result<(u64, u64), ShapefileError> {
    reader.seek_to(SHP_HEADER_LEN + index as u64 * 8)?;
    let offset_words = reader.read_i32_be()?;
    let length_words = reader.read_i32_be()?;
    if offset_words < 0 || length_words < 0 {
        return Err(ShapefileError::MalformedShp(format!(
            "negative shx entry for record {}",
            index
        )));
    }
    Ok((offset_words as u64 * 2, length_words as u64 * 2))
}

/// Number of records an `.shx` file of `file_bytes` total bytes describes.
pub fn shx_record_count(file_bytes: u64) -> u32 {
    (file_bytes.saturating_sub(SHP_HEADER_LEN) / 8) as u32
}

/// Read the geometry record at `offset` in an open `.shp` source.
///
/// Returns the 1-based record number from the record header together with
/// the decoded geometry. Z, M, MultiPoint and MultiPatch bodies are not
/// decoded; they come back as [`Geometry::Null`].
pub fn read_geometry_record<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    offset: u64,
) -> Result<(i32, Geometry), ShapefileError> {
    reader.seek_to(offset)?;
    let record_number = reader.read_i32_be()?;
    let content_words = reader.read_i32_be()?;
    if content_words < 0 {
        return Err(ShapefileError::MalformedShp(format!(
            "record {} declares negative content length",
            record_number
        )));
    }
    let content_bytes = content_words as u64 * 2;
    if content_bytes < RECORD_TYPE_LEN {
        return Err(ShapefileError::MalformedShp(format!(
            "record {} content too short for a shape type",
            record_number
        )));
    }

    let type_code = reader.read_i32_le()?;
    let shape_type = ShapeType::from_code(type_code).ok_or_else(|| {
        ShapefileError::MalformedShp(format!(
            "record {} has unknown shape type code {}",
            record_number, type_code
        ))
    })?;

    let geometry = match shape_type {
        ShapeType::NullShape => Geometry::Null,
        ShapeType::Point => read_point(reader, record_number, content_bytes)?,
        ShapeType::PolyLine => {
            Geometry::Polyline(read_poly_parts(reader, record_number, content_bytes)?)
        }
        ShapeType::Polygon => {
            Geometry::Polygon(read_poly_parts(reader, record_number, content_bytes)?)
        }
        // Z / M / MultiPoint / MultiPatch bodies are out of scope
        _ => Geometry::Null,
    };

    Ok((record_number, geometry))
}

fn read_point<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    record_number: i32,
    content_bytes: u64,
) -> Result<Geometry, ShapefileError> {
    if content_bytes < RECORD_TYPE_LEN + 16 {
        return Err(ShapefileError::MalformedShp(format!(
            "record {} content too short for a point",
            record_number
        )));
    }
    let x = reader.read_f64_le()?;
    let y = reader.read_f64_le()?;
    Ok(Geometry::Point(Point::new(x, y)))
}

/// Decode a polyline/polygon body into its parts (rings).
///
/// The layout is bbox, part count, point count, part start indices, then
/// the flat vertex array; vertices are sliced into parts by the start
/// indices with the last part running to the end.
fn read_poly_parts<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    record_number: i32,
    content_bytes: u64,
) -> Result<Vec<Vec<Point>>, ShapefileError> {
    if content_bytes < RECORD_TYPE_LEN + POLY_PRELUDE_LEN {
        return Err(ShapefileError::MalformedShp(format!(
            "record {} content too short for a poly prelude",
            record_number
        )));
    }
    reader.skip(32)?; // per-record bbox, recomputed from vertices on demand

    let num_parts = reader.read_i32_le()?;
    let num_points = reader.read_i32_le()?;
    if num_parts < 0 || num_points < 0 {
        return Err(ShapefileError::MalformedShp(format!(
            "record {} declares negative part/point counts",
            record_number
        )));
    }
    let num_parts = num_parts as usize;
    let num_points = num_points as usize;

    // Refuse to read past the declared content boundary.
    let required = RECORD_TYPE_LEN + POLY_PRELUDE_LEN + 4 * num_parts as u64 + 16 * num_points as u64;
    if required > content_bytes {
        return Err(ShapefileError::MalformedShp(format!(
            "record {} needs {} content bytes but declares {}",
            record_number, required, content_bytes
        )));
    }

    let mut starts = Vec::with_capacity(num_parts);
    for _ in 0..num_parts {
        let start = reader.read_i32_le()?;
        if start < 0 || start as usize >= num_points.max(1) {
            return Err(ShapefileError::MalformedShp(format!(
                "record {} part start {} out of range ({} points)",
                record_number, start, num_points
            )));
        }
        if let Some(&prev) = starts.last() {
            if (start as usize) < prev {
                return Err(ShapefileError::MalformedShp(format!(
                    "record {} part starts are not ascending",
                    record_number
                )));
            }
        }
        starts.push(start as usize);
    }

    let mut points = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        let x = reader.read_f64_le()?;
        let y = reader.read_f64_le()?;
        points.push(Point::new(x, y));
    }

    let mut parts = Vec::with_capacity(num_parts);
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(num_points);
        parts.push(points[start..end].to_vec());
    }
    Ok(parts)
}
