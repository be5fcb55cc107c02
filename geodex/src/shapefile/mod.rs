//! Shapefile ingestion
//!
//! Decoders for the three-file ESRI shapefile family: `.shp` (geometry),
//! `.shx` (record index) and `.dbf` (dBase III attributes). The formats mix
//! big-endian record framing with little-endian payloads, so every read in
//! this module names its byte order explicitly.
//!
//! [`ShapefileReader`] is the entry point: it opens `base.shp` + `base.shx`
//! (required) and `base.dbf` (optional), parses all headers up front, and
//! then serves O(1) record reads through the `.shx` offsets.

mod bytes;
mod dbf;
mod reader;
mod record;
mod shp;

pub use bytes::ByteReader;
pub use dbf::{DbfFile, FieldDefinition, FieldType, FieldValue};
pub use reader::{ShapefileInfo, ShapefileReader};
pub use record::ShapeRecord;
pub use shp::{MainFileHeader, SHP_FILE_CODE, SHP_HEADER_LEN};

use thiserror::Error;

/// Errors raised while opening or decoding a shapefile.
#[derive(Debug, Error)]
pub enum ShapefileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The byte source ended before a fixed-width read completed.
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("malformed .shp: {0}")]
    MalformedShp(String),
    #[error("malformed .dbf: {0}")]
    MalformedDbf(String),
    #[error("record index {index} out of range (record count is {count})")]
    OutOfRange { index: u32, count: u32 },
}
