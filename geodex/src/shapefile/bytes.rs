//! Endian-aware fixed-width reads over a seekable byte source.

use std::io::{Read, Seek, SeekFrom};

use super::ShapefileError;

/// Reads fixed-width integers and IEEE-754 doubles from a seekable source.
///
/// Shapefile headers mix big-endian framing fields with little-endian
/// payloads, so there is one method per (width, order) pair rather than a
/// default byte order. There is no lookahead: callers seek to absolute
/// offsets computed from header metadata.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
}

impl<R: Read + Seek> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Seek to an absolute byte offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<(), ShapefileError> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Skip forward past `count` bytes.
    pub fn skip(&mut self, count: i64) -> Result<(), ShapefileError> {
        self.inner.seek(SeekFrom::Current(count))?;
        Ok(())
    }

    /// Current byte offset from the start of the source.
    pub fn position(&mut self) -> Result<u64, ShapefileError> {
        Ok(self.inner.stream_position()?)
    }

    /// Total length of the source in bytes. Restores the read position.
    pub fn stream_len(&mut self) -> Result<u64, ShapefileError> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ShapefileError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ShapefileError::UnexpectedEof
            } else {
                ShapefileError::Io(e)
            }
        })?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, ShapefileError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i32_be(&mut self) -> Result<i32, ShapefileError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, ShapefileError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ShapefileError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ShapefileError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64_le(&mut self) -> Result<f64, ShapefileError> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, ShapefileError> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ShapefileError::UnexpectedEof
            } else {
                ShapefileError::Io(e)
            }
        })?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_mixed_endian_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&9994i32.to_be_bytes());
        data.extend_from_slice(&1000i32.to_le_bytes());
        data.extend_from_slice(&10.5f64.to_le_bytes());
        data.extend_from_slice(&0xBEEFu16.to_le_bytes());

        let mut reader = ByteReader::new(Cursor::new(data));
        assert_eq!(reader.read_i32_be().unwrap(), 9994);
        assert_eq!(reader.read_i32_le().unwrap(), 1000);
        assert_eq!(reader.read_f64_le().unwrap(), 10.5);
        assert_eq!(reader.read_u16_le().unwrap(), 0xBEEF);
    }

    #[test]
    fn test_short_read_is_unexpected_eof() {
        let mut reader = ByteReader::new(Cursor::new(vec![0u8, 1, 2]));
        let err = reader.read_i32_be().unwrap_err();
        assert!(matches!(err, ShapefileError::UnexpectedEof));
    }

    #[test]
    fn test_seek_and_position() {
        let mut reader = ByteReader::new(Cursor::new(vec![0u8; 64]));
        reader.seek_to(10).unwrap();
        assert_eq!(reader.position().unwrap(), 10);
        reader.skip(6).unwrap();
        assert_eq!(reader.position().unwrap(), 16);
        assert_eq!(reader.stream_len().unwrap(), 64);
        // stream_len() must not move the cursor
        assert_eq!(reader.position().unwrap(), 16);
    }

    #[test]
    fn test_read_bytes_exact() {
        let mut reader = ByteReader::new(Cursor::new(b"abcdef".to_vec()));
        assert_eq!(reader.read_bytes(3).unwrap(), b"abc");
        assert_eq!(reader.read_bytes(3).unwrap(), b"def");
        assert!(matches!(
            reader.read_bytes(1).unwrap_err(),
            ShapefileError::UnexpectedEof
        ));
    }
}
