use crate::chunk::Chunk;
use crate::error::MaxDumpError;

const IDN_HEADER: u16 = 0x21c0;
const IDN_ENTRY: u16 = 0x2038;
const IDN_DESCRIPTION: u16 = 0x2039;
const IDN_NAME: u16 = 0x2037;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DllEntry {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct DllDirectory {
    pub header: Option<Vec<u8>>,
    pub entries: Vec<DllEntry>,
}

/* Interprets the top-level chunks of the `DllDirectory` stream. Purely a
 * stateless transform: every tag not in {0x21c0, 0x2038} is a hard error,
 * since this stream (unlike the generic chunk tree) has a fully known
 * shape.
 */
pub struct DllDecoder;

impl DllDecoder {
    pub fn decode(chunks: &[Chunk]) -> Result<DllDirectory, MaxDumpError> {
        let mut directory = DllDirectory::default();

        for chunk in chunks {
            match chunk.idn() {
                IDN_HEADER => {
                    let bytes = chunk.as_value().ok_or_else(|| {
                        MaxDumpError::MalformedDllEntry(
                            "0x21c0 stream header must be a value chunk".to_string(),
                        )
                    })?;
                    directory.header = Some(bytes.to_vec());
                }
                IDN_ENTRY => {
                    directory.entries.push(decode_entry(chunk)?);
                }
                other => {
                    return Err(MaxDumpError::UnknownDllTag(other));
                }
            }
        }

        return Ok(directory);
    }
}

fn decode_entry(chunk: &Chunk) -> Result<DllEntry, MaxDumpError> {
    let children = chunk.children().ok_or_else(|| {
        MaxDumpError::MalformedDllEntry("0x2038 dll entry must be a container".to_string())
    })?;

    if children.len() != 2 {
        return Err(MaxDumpError::MalformedDllEntry(format!(
            "dll entry must have exactly 2 children, found {}",
            children.len()
        )));
    }

    if children[0].idn() != IDN_DESCRIPTION || children[1].idn() != IDN_NAME {
        return Err(MaxDumpError::MalformedDllEntry(format!(
            "dll entry children must be [0x{IDN_DESCRIPTION:x}, 0x{IDN_NAME:x}], found [{:#x}, {:#x}]",
            children[0].idn(),
            children[1].idn()
        )));
    }

    let description = decode_utf16le(children[0].as_value().ok_or_else(|| {
        MaxDumpError::MalformedDllEntry("dll description must be a value chunk".to_string())
    })?)?;
    let name = decode_utf16le(children[1].as_value().ok_or_else(|| {
        MaxDumpError::MalformedDllEntry("dll name must be a value chunk".to_string())
    })?)?;

    return Ok(DllEntry { name, description });
}

pub fn decode_utf16le(bytes: &[u8]) -> Result<String, MaxDumpError> {
    if bytes.len() % 2 != 0 {
        return Err(MaxDumpError::MalformedDllEntry(
            "utf-16le payload has odd byte length".to_string(),
        ));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let s = String::from_utf16_lossy(&units);
    return Ok(s.trim_end_matches('\u{0}').to_string());
}
