use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::MaxDumpError;

/*
 * Little-endian reader over an in-memory byte buffer, built on byteorder
 * the same way the rest of this codebase's binary-format readers are. A
 * short read (fewer bytes available than requested) is always a fatal
 * MaxDumpError::ShortRead, never a panic or a silent truncation.
 */
#[derive(Debug)]
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            cursor: Cursor::new(data),
        }
    }

    pub fn tell(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn seek(&mut self, pos: usize) {
        self.cursor.set_position(pos as u64);
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.tell())
    }

    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, MaxDumpError> {
        if self.remaining() < n {
            return Err(MaxDumpError::ShortRead {
                wanted: n,
                available: self.remaining(),
            });
        }

        let mut buf = vec![0u8; n];
        self.cursor.read_exact(&mut buf)?;

        return Ok(buf);
    }

    pub fn read_u16_le(&mut self) -> Result<u16, MaxDumpError> {
        if self.remaining() < 2 {
            return Err(MaxDumpError::ShortRead {
                wanted: 2,
                available: self.remaining(),
            });
        }
        return Ok(self.cursor.read_u16::<LittleEndian>()?);
    }

    pub fn read_i32_le(&mut self) -> Result<i32, MaxDumpError> {
        if self.remaining() < 4 {
            return Err(MaxDumpError::ShortRead {
                wanted: 4,
                available: self.remaining(),
            });
        }
        return Ok(self.cursor.read_i32::<LittleEndian>()?);
    }

    pub fn read_u32_le(&mut self) -> Result<u32, MaxDumpError> {
        if self.remaining() < 4 {
            return Err(MaxDumpError::ShortRead {
                wanted: 4,
                available: self.remaining(),
            });
        }
        return Ok(self.cursor.read_u32::<LittleEndian>()?);
    }

    pub fn read_i64_le(&mut self) -> Result<i64, MaxDumpError> {
        if self.remaining() < 8 {
            return Err(MaxDumpError::ShortRead {
                wanted: 8,
                available: self.remaining(),
            });
        }
        return Ok(self.cursor.read_i64::<LittleEndian>()?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_scalars() {
        let data = [0x50, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
        let mut r = ByteReader::new(&data);

        assert_eq!(r.read_u16_le().unwrap(), 0x0050);
        assert_eq!(r.read_i32_le().unwrap(), 0x0000000a);
        assert_eq!(r.read_i32_le().unwrap(), 1);
    }

    #[test]
    fn short_read_is_fatal() {
        let data = [0x01, 0x02];
        let mut r = ByteReader::new(&data);

        let err = r.read_i32_le().unwrap_err();
        assert!(matches!(err, MaxDumpError::ShortRead { .. }));
    }

    #[test]
    fn tell_and_seek_roundtrip() {
        let data = [0u8; 16];
        let mut r = ByteReader::new(&data);

        r.read(4).unwrap();
        assert_eq!(r.tell(), 4);

        r.seek(0);
        assert_eq!(r.tell(), 0);
    }
}
