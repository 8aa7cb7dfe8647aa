use crate::error::MaxDumpError;
use crate::reader::ByteReader;

/*
 * Wire format: [idn u16][length i32, MSB = container flag]
 *              [(optional) extended i64, present iff length == 0]
 *              [payload]
 * `length`/the extended length are inclusive of the header they follow.
 */
const SHORT_HEADER_BYTES: usize = 2 + 4;
const EXTENDED_HEADER_BYTES: usize = SHORT_HEADER_BYTES + 8;

const MAX_NEST_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkKind {
    Container,
    Value,
}

#[derive(Clone, Debug)]
pub struct ChunkHeader {
    pub idn: u16,
    pub value_length: usize,
    pub kind: ChunkKind,
    pub extended: bool,
}

#[derive(Clone, Debug)]
pub enum Chunk {
    Value {
        header: ChunkHeader,
        bytes: Vec<u8>,
    },
    Container {
        header: ChunkHeader,
        children: Vec<Chunk>,
    },
}

impl Chunk {
    pub fn header(&self) -> &ChunkHeader {
        match self {
            Chunk::Value { header, .. } => header,
            Chunk::Container { header, .. } => header,
        }
    }

    pub fn idn(&self) -> u16 {
        self.header().idn
    }

    pub fn as_value(&self) -> Option<&[u8]> {
        match self {
            Chunk::Value { bytes, .. } => Some(bytes),
            Chunk::Container { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&[Chunk]> {
        match self {
            Chunk::Container { children, .. } => Some(children),
            Chunk::Value { .. } => None,
        }
    }
}

/* Chunk parser: a recursive-descent reader over a tagged, length-prefixed
 * byte stream. Unknown tags are never errors here -- this layer is purely
 * structural and forward compatibility with unseen chunk ids depends on it.
 */
pub struct ChunkParser;

impl ChunkParser {
    pub fn parse(buf: &[u8]) -> Result<Vec<Chunk>, MaxDumpError> {
        let mut reader = ByteReader::new(buf);
        return Self::read_sequence(&mut reader, buf.len(), 0);
    }

    pub fn read_header(reader: &mut ByteReader) -> Result<ChunkHeader, MaxDumpError> {
        let idn = reader.read_u16_le()?;
        let short_length = reader.read_i32_le()?;

        let (extended, is_container, magnitude): (bool, bool, u64) = if short_length == 0 {
            let extended_length = reader.read_i64_le()?;
            if extended_length == 0 {
                return Err(MaxDumpError::MalformedChunk(
                    "extended length cannot be zero".to_string(),
                ));
            }
            let bits = extended_length as u64;
            let sign_bit = 1u64 << 63;
            let is_container = bits & sign_bit != 0;
            let magnitude = if is_container { bits & !sign_bit } else { bits };
            (true, is_container, magnitude)
        } else {
            let bits = short_length as u32;
            let sign_bit = 1u32 << 31;
            let is_container = bits & sign_bit != 0;
            let magnitude = if is_container { bits & !sign_bit } else { bits };
            (false, is_container, magnitude as u64)
        };

        let kind = if is_container {
            ChunkKind::Container
        } else {
            ChunkKind::Value
        };

        let header_byte_size = if extended {
            EXTENDED_HEADER_BYTES
        } else {
            SHORT_HEADER_BYTES
        } as u64;

        if magnitude < header_byte_size {
            return Err(MaxDumpError::MalformedChunk(format!(
                "chunk length {magnitude} smaller than its own header ({header_byte_size})"
            )));
        }

        let value_length = (magnitude - header_byte_size) as usize;

        return Ok(ChunkHeader {
            idn,
            value_length,
            kind,
            extended,
        });
    }

    pub fn read_one(reader: &mut ByteReader, depth: usize) -> Result<Chunk, MaxDumpError> {
        if depth > MAX_NEST_DEPTH {
            return Err(MaxDumpError::MalformedChunk(format!(
                "nesting depth exceeded {MAX_NEST_DEPTH}"
            )));
        }

        let header = Self::read_header(reader)?;

        log::debug!(
            "chunk idn={:#x} kind={:?} value_length={} depth={}",
            header.idn,
            header.kind,
            header.value_length,
            depth
        );

        match header.kind {
            ChunkKind::Value => {
                let bytes = reader.read(header.value_length)?;
                return Ok(Chunk::Value { header, bytes });
            }
            ChunkKind::Container => {
                let children = Self::read_sequence(reader, header.value_length, depth + 1)?;
                return Ok(Chunk::Container { header, children });
            }
        }
    }

    fn read_sequence(
        reader: &mut ByteReader,
        byte_budget: usize,
        depth: usize,
    ) -> Result<Vec<Chunk>, MaxDumpError> {
        let start = reader.tell();
        let mut items = Vec::new();

        while reader.tell() - start < byte_budget {
            let chunk = Self::read_one(reader, depth)?;
            items.push(chunk);

            let consumed = reader.tell() - start;
            if consumed > byte_budget {
                return Err(MaxDumpError::MalformedChunk(format!(
                    "container overrun: consumed {consumed} of {byte_budget} declared bytes"
                )));
            }
        }

        return Ok(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_value_header() {
        let data = [0x50, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
        let chunks = ChunkParser::parse(&data).unwrap();

        assert_eq!(chunks.len(), 1);
        match &chunks[0] {
            Chunk::Value { header, bytes } => {
                assert_eq!(header.idn, 0x0050);
                assert_eq!(header.value_length, 4);
                assert!(!header.extended);
                assert_eq!(bytes, &[0x01, 0x00, 0x00, 0x00]);
            }
            _ => panic!("expected a value chunk"),
        }
    }

    #[test]
    fn short_container_header() {
        let data = [0x50, 0x00, 0x0a, 0x00, 0x00, 0x80];
        let mut reader = ByteReader::new(&data);
        let header = ChunkParser::read_header(&mut reader).unwrap();

        assert_eq!(header.idn, 0x0050);
        assert_eq!(header.value_length, 4);
        assert_eq!(header.kind, ChunkKind::Container);
        assert!(!header.extended);
    }

    #[test]
    fn extended_value_header() {
        let data = [
            0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut reader = ByteReader::new(&data);
        let header = ChunkParser::read_header(&mut reader).unwrap();

        assert_eq!(header.idn, 0x0050);
        assert_eq!(header.value_length, 4);
        assert_eq!(header.kind, ChunkKind::Value);
        assert!(header.extended);
    }

    #[test]
    fn extended_container_header() {
        let data = [
            0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80,
        ];
        let mut reader = ByteReader::new(&data);
        let header = ChunkParser::read_header(&mut reader).unwrap();

        assert_eq!(header.kind, ChunkKind::Container);
        assert!(header.extended);
    }

    #[test]
    fn nested_parse() {
        let data: Vec<u8> = vec![
            0x50, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x60, 0x00, 0x2a, 0x00,
            0x00, 0x80, 0x10, 0x00, 0x1e, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x01, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x12, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x06, 0x00, 0x00, 0x00,
        ];

        let chunks = ChunkParser::parse(&data).unwrap();
        assert_eq!(chunks.len(), 2);

        match &chunks[0] {
            Chunk::Value { header, .. } => {
                assert_eq!(header.idn, 0x50);
                assert_eq!(header.value_length, 4);
            }
            _ => panic!("expected a value chunk"),
        }

        match &chunks[1] {
            Chunk::Container { header, children } => {
                assert_eq!(header.idn, 0x60);
                assert_eq!(header.value_length, 36);
                assert_eq!(children.len(), 2);

                assert_eq!(children[0].idn(), 0x10);
                assert_eq!(children[0].as_value().unwrap().len(), 24);

                assert_eq!(children[1].idn(), 0x20);
                assert_eq!(children[1].as_value().unwrap().len(), 0);
            }
            _ => panic!("expected a container chunk"),
        }
    }

    #[test]
    fn container_overrun_is_malformed() {
        // Container declares an 8-byte value budget, but its two
        // 6-byte children together consume 12 bytes.
        let mut data = vec![0x01, 0x00, 0x0e, 0x00, 0x00, 0x80];
        data.extend_from_slice(&[0x02, 0x00, 0x06, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&[0x03, 0x00, 0x06, 0x00, 0x00, 0x00]);

        let result = ChunkParser::parse(&data);
        assert!(result.is_err());
    }
}
