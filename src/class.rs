use crate::chunk::Chunk;
use crate::dll::decode_utf16le;
use crate::error::MaxDumpError;

const IDN_CLASS_ENTRY: u16 = 0x2040;
const IDN_CLASS_HEADER: u16 = 0x2060;
const IDN_CLASS_NAME: u16 = 0x2042;

pub const DLL_INDEX_BUILTIN: i32 = -1;
pub const DLL_INDEX_SCRIPT: i32 = -2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassHeader {
    pub dll_index: i32,
    pub class_id: (u32, u32),
    pub super_class_id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub dll_index: i32,
    pub class_id: (u32, u32),
    pub super_class_id: u32,
}

/* Interprets the top-level chunks of the `ClassDirectory3` stream. The
 * 0-based position of each decoded entry in the returned list is the
 * "class index" that the Scene stream addresses by -- callers must not
 * reorder this list.
 */
pub struct ClassDecoder;

impl ClassDecoder {
    pub fn decode(chunks: &[Chunk]) -> Result<Vec<ClassEntry>, MaxDumpError> {
        let mut entries = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            entries.push(decode_entry(chunk)?);
        }

        return Ok(entries);
    }
}

fn decode_entry(chunk: &Chunk) -> Result<ClassEntry, MaxDumpError> {
    if chunk.idn() != IDN_CLASS_ENTRY {
        return Err(MaxDumpError::MalformedClassEntry(format!(
            "expected class entry tag 0x{IDN_CLASS_ENTRY:x}, found {:#x}",
            chunk.idn()
        )));
    }

    let children = chunk.children().ok_or_else(|| {
        MaxDumpError::MalformedClassEntry("class entry must be a container".to_string())
    })?;

    if children.len() != 2 {
        return Err(MaxDumpError::MalformedClassEntry(format!(
            "class entry must have exactly 2 children, found {}",
            children.len()
        )));
    }

    if children[0].idn() != IDN_CLASS_HEADER || children[1].idn() != IDN_CLASS_NAME {
        return Err(MaxDumpError::MalformedClassEntry(format!(
            "class entry children must be [0x{IDN_CLASS_HEADER:x}, 0x{IDN_CLASS_NAME:x}], found [{:#x}, {:#x}]",
            children[0].idn(),
            children[1].idn()
        )));
    }

    let header = decode_header(children[0].as_value().ok_or_else(|| {
        MaxDumpError::MalformedClassEntry("class header must be a value chunk".to_string())
    })?)?;

    let name = decode_utf16le(children[1].as_value().ok_or_else(|| {
        MaxDumpError::MalformedClassEntry("class name must be a value chunk".to_string())
    })?)
    .map_err(|e| MaxDumpError::MalformedClassEntry(e.to_string()))?;

    return Ok(ClassEntry {
        name,
        dll_index: header.dll_index,
        class_id: header.class_id,
        super_class_id: header.super_class_id,
    });
}

fn decode_header(bytes: &[u8]) -> Result<ClassHeader, MaxDumpError> {
    if bytes.len() != 16 {
        return Err(MaxDumpError::MalformedClassEntry(format!(
            "class header must be 16 bytes, found {}",
            bytes.len()
        )));
    }

    let read_u32 = |offset: usize| -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    };

    let dll_index = read_u32(0) as i32;
    let class_id_lo = read_u32(4);
    let class_id_hi = read_u32(8);
    let super_class_id = read_u32(12);

    return Ok(ClassHeader {
        dll_index,
        class_id: (class_id_lo, class_id_hi),
        super_class_id,
    });
}
