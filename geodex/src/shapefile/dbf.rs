//! dBase III attribute file decoding.
//!
//! A `.dbf` file is a 32-byte header, a run of 32-byte field descriptors
//! closed by a 0x0D terminator, then fixed-width records. Every record
//! starts with a one-byte deletion flag (`*` marks deleted) followed by the
//! fields packed at the widths the descriptors declare. All multi-byte
//! header integers are little-endian.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Seek};

use super::bytes::ByteReader;
use super::ShapefileError;

/// Size of the fixed portion of the header, and of each field descriptor.
const DESCRIPTOR_LEN: u16 = 32;
/// Marks the end of the field descriptor array.
const HEADER_TERMINATOR: u8 = 0x0D;

/// Attribute column types recognized in field descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Logical,
    Date,
    Float,
    Unknown,
}

impl FieldType {
    fn from_type_char(c: u8) -> Self {
        match c {
            b'C' => FieldType::Character,
            b'N' => FieldType::Numeric,
            b'L' => FieldType::Logical,
            b'D' => FieldType::Date,
            b'F' => FieldType::Float,
            _ => FieldType::Unknown,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Character => "Character",
            FieldType::Numeric => "Numeric",
            FieldType::Logical => "Logical",
            FieldType::Date => "Date",
            FieldType::Float => "Float",
            FieldType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Integer(i64),
}

impl FieldValue {
    /// The textual content, when this value carries text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// One column as declared in the header's descriptor array.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    /// On-disk byte width of the field.
    pub length: u8,
    pub decimal_count: u8,
}

/// An open dBase III attribute file.
#[derive(Debug)]
pub struct DbfFile<R> {
    reader: ByteReader<R>,
    record_count: u32,
    header_length: u16,
    record_length: u16,
    fields: Vec<FieldDefinition>,
}

impl<R: Read + Seek> DbfFile<R> {
    /// Parse the header and descriptor array from a seekable source.
    pub fn open(source: R) -> Result<Self, ShapefileError> {
        let mut reader = ByteReader::new(source);
        reader.seek_to(0)?;

        let _version = reader.read_u8()?;
        reader.skip(3)?; // last-update date
        let record_count = reader.read_u32_le()?;
        let header_length = reader.read_u16_le()?;
        let record_length = reader.read_u16_le()?;
        reader.skip(20)?; // reserved

        if header_length < DESCRIPTOR_LEN + 1 {
            return Err(ShapefileError::MalformedDbf(format!(
                "header length {} too small",
                header_length
            )));
        }

        // Descriptors fill the header up to the terminator byte.
        let mut fields = Vec::new();
        let mut offset = DESCRIPTOR_LEN;
        while offset < header_length - 1 {
            if header_length - 1 - offset < DESCRIPTOR_LEN {
                return Err(ShapefileError::MalformedDbf(format!(
                    "field descriptor at offset {} overruns header length {}",
                    offset, header_length
                )));
            }
            fields.push(Self::read_descriptor(&mut reader)?);
            offset += DESCRIPTOR_LEN;
        }

        if reader.read_u8()? != HEADER_TERMINATOR {
            return Err(ShapefileError::MalformedDbf(
                "missing 0x0D header terminator".to_string(),
            ));
        }

        tracing::debug!(
            records = record_count,
            fields = fields.len(),
            record_length,
            "parsed dbf header"
        );

        Ok(Self {
            reader,
            record_count,
            header_length,
            record_length,
            fields,
        })
    }

    fn read_descriptor(reader: &mut ByteReader<R>) -> Result<FieldDefinition, ShapefileError> {
        let name_bytes = reader.read_bytes(11)?;
        let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&name_bytes[..name_end])
            .trim()
            .to_string();

        let field_type = FieldType::from_type_char(reader.read_u8()?);
        reader.skip(4)?; // field data address
        let length = reader.read_u8()?;
        let decimal_count = reader.read_u8()?;
        reader.skip(14)?; // reserved

        if length == 0 {
            return Err(ShapefileError::MalformedDbf(format!(
                "field '{}' declares zero length",
                name
            )));
        }

        Ok(FieldDefinition {
            name,
            field_type,
            length,
            decimal_count,
        })
    }

    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Read record `index` into an attribute map.
    ///
    /// Returns `Ok(None)` for records whose deletion flag is set.
    pub fn read_record(
        &mut self,
        index: u32,
    ) -> Result<Option<HashMap<String, FieldValue>>, ShapefileError> {
        if index >= self.record_count {
            return Err(ShapefileError::OutOfRange {
                index,
                count: self.record_count,
            });
        }

        let offset = self.header_length as u64 + index as u64 * self.record_length as u64;
        self.reader.seek_to(offset)?;

        if self.reader.read_u8()? == b'*' {
            return Ok(None);
        }

        let mut attributes = HashMap::with_capacity(self.fields.len());
        for field in &self.fields {
            let raw = self.reader.read_bytes(field.length as usize)?;
            let text = String::from_utf8_lossy(&raw);
            let trimmed = text.trim();
            attributes.insert(field.name.clone(), parse_field_value(trimmed, field.field_type));
        }
        Ok(Some(attributes))
    }
}

/// Convert a trimmed field string per its declared type.
///
/// Numeric conversion failures yield 0.0 rather than an error; shapefile
/// attribute tables are full of blank and junk numeric cells.
fn parse_field_value(trimmed: &str, field_type: FieldType) -> FieldValue {
    match field_type {
        FieldType::Numeric | FieldType::Float => {
            FieldValue::Number(trimmed.parse::<f64>().unwrap_or(0.0))
        }
        FieldType::Logical => {
            FieldValue::Boolean(matches!(trimmed, "T" | "t" | "Y" | "y"))
        }
        // Character, Date and Unknown all stay textual
        _ => FieldValue::Text(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Build a minimal dbf byte image with the given fields and rows.
    ///
    /// Each row is a (deleted, cell strings) pair; cells are padded to the
    /// declared field width.
    fn build_dbf(fields: &[(&str, u8, u8)], rows: &[(bool, Vec<&str>)]) -> Vec<u8> {
        let header_length = 32 + fields.len() * 32 + 1;
        let record_length: usize = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();

        let mut data = Vec::new();
        data.push(0x03); // version
        data.extend_from_slice(&[24, 1, 1]); // last update
        data.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        data.extend_from_slice(&(header_length as u16).to_le_bytes());
        data.extend_from_slice(&(record_length as u16).to_le_bytes());
        data.extend_from_slice(&[0u8; 20]);

        for (name, type_char, length) in fields {
            let mut name_bytes = [0u8; 11];
            name_bytes[..name.len()].copy_from_slice(name.as_bytes());
            data.extend_from_slice(&name_bytes);
            data.push(*type_char);
            data.extend_from_slice(&[0u8; 4]);
            data.push(*length);
            data.push(0); // decimal count
            data.extend_from_slice(&[0u8; 14]);
        }
        data.push(0x0D);

        for (deleted, cells) in rows {
            data.push(if *deleted { b'*' } else { b' ' });
            for (cell, (_, _, length)) in cells.iter().zip(fields) {
                let mut padded = vec![b' '; *length as usize];
                padded[..cell.len()].copy_from_slice(cell.as_bytes());
                data.extend_from_slice(&padded);
            }
        }
        data
    }

    #[test]
    fn test_header_fields() {
        let data = build_dbf(
            &[("NAME", b'C', 8), ("POP", b'N', 10)],
            &[(false, vec!["abc", "1234"])],
        );
        let dbf = DbfFile::open(Cursor::new(data)).unwrap();

        assert_eq!(dbf.record_count(), 1);
        assert_eq!(dbf.fields().len(), 2);
        assert_eq!(dbf.fields()[0].name, "NAME");
        assert_eq!(dbf.fields()[0].field_type, FieldType::Character);
        assert_eq!(dbf.fields()[0].length, 8);
        assert_eq!(dbf.fields()[1].field_type, FieldType::Numeric);
    }

    #[test]
    fn test_read_record_typed_values() {
        let data = build_dbf(
            &[("NAME", b'C', 8), ("POP", b'N', 10), ("ACTIVE", b'L', 1)],
            &[(false, vec!["abc", "1234.5", "T"])],
        );
        let mut dbf = DbfFile::open(Cursor::new(data)).unwrap();
        let record = dbf.read_record(0).unwrap().unwrap();

        assert_eq!(record["NAME"], FieldValue::Text("abc".to_string()));
        assert_eq!(record["POP"], FieldValue::Number(1234.5));
        assert_eq!(record["ACTIVE"], FieldValue::Boolean(true));
    }

    #[test]
    fn test_logical_false_variants() {
        let data = build_dbf(&[("FLAG", b'L', 1)], &[(false, vec!["F"]), (false, vec!["?"])]);
        let mut dbf = DbfFile::open(Cursor::new(data)).unwrap();
        assert_eq!(
            dbf.read_record(0).unwrap().unwrap()["FLAG"],
            FieldValue::Boolean(false)
        );
        assert_eq!(
            dbf.read_record(1).unwrap().unwrap()["FLAG"],
            FieldValue::Boolean(false)
        );
    }

    #[test]
    fn test_numeric_garbage_becomes_zero() {
        let data = build_dbf(&[("POP", b'N', 8)], &[(false, vec!["xx"]), (false, vec![""])]);
        let mut dbf = DbfFile::open(Cursor::new(data)).unwrap();
        assert_eq!(dbf.read_record(0).unwrap().unwrap()["POP"], FieldValue::Number(0.0));
        assert_eq!(dbf.read_record(1).unwrap().unwrap()["POP"], FieldValue::Number(0.0));
    }

    #[test]
    fn test_deleted_record_is_none() {
        let data = build_dbf(
            &[("NAME", b'C', 4)],
            &[(true, vec!["gone"]), (false, vec!["here"])],
        );
        let mut dbf = DbfFile::open(Cursor::new(data)).unwrap();
        assert!(dbf.read_record(0).unwrap().is_none());
        let kept = dbf.read_record(1).unwrap().unwrap();
        assert_eq!(kept["NAME"], FieldValue::Text("here".to_string()));
    }

    #[test]
    fn test_out_of_range_index() {
        let data = build_dbf(&[("NAME", b'C', 4)], &[(false, vec!["only"])]);
        let mut dbf = DbfFile::open(Cursor::new(data)).unwrap();
        let err = dbf.read_record(1).unwrap_err();
        assert!(matches!(err, ShapefileError::OutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn test_missing_terminator_is_malformed() {
        let mut data = build_dbf(&[("NAME", b'C', 4)], &[(false, vec!["abcd"])]);
        // Find and corrupt the terminator byte at offset 32 + 32
        data[64] = 0x00;
        let err = DbfFile::open(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, ShapefileError::MalformedDbf(_)));
    }

    #[test]
    fn test_descriptor_overrun_is_malformed() {
        let mut data = build_dbf(&[("NAME", b'C', 4)], &[(false, vec!["abcd"])]);
        // Declare a header length that truncates mid-descriptor
        data[8..10].copy_from_slice(&40u16.to_le_bytes());
        let err = DbfFile::open(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, ShapefileError::MalformedDbf(_)));
    }

    #[test]
    fn test_unknown_type_char_reads_as_text() {
        let data = build_dbf(&[("BLOB", b'X', 4)], &[(false, vec!["data"])]);
        let mut dbf = DbfFile::open(Cursor::new(data)).unwrap();
        assert_eq!(dbf.fields()[0].field_type, FieldType::Unknown);
        assert_eq!(
            dbf.read_record(0).unwrap().unwrap()["BLOB"],
            FieldValue::Text("data".to_string())
        );
    }
}
