use crate::error::MaxDumpError;
use crate::reader::ByteReader;

const HEADER_MARKER: [u8; 4] = [0x1e, 0x00, 0x00, 0x00];
const HEADER_DELIM: [u8; 4] = [0x03, 0x00, 0x00, 0x00];
const PROPERTY_LIST_SENTINEL: [u8; 4] = [0x1e, 0x10, 0x00, 0x00];

struct Header {
    name: String,
    count: i32,
}

/* Decodes the `\x05DocumentSummaryInformation` stream. This is a
 * distinct wire layout from the chunk tree in chunk.rs -- headers
 * followed by a flat run of properties, addressed positionally by
 * per-header counts rather than by tag.
 */
pub struct PropertyParser;

impl PropertyParser {
    pub fn parse(buf: &[u8]) -> Result<Vec<(String, Vec<String>)>, MaxDumpError> {
        let marker_pos = find_marker(buf, &HEADER_MARKER).ok_or_else(|| {
            MaxDumpError::MalformedProperties("no 0x1e000000 header marker found".to_string())
        })?;

        let mut reader = ByteReader::new(&buf[marker_pos..]);

        let headers = read_headers(&mut reader)?;

        let sentinel = reader.read(4)?;
        if sentinel != PROPERTY_LIST_SENTINEL {
            return Err(MaxDumpError::MalformedProperties(
                "missing 0x1e100000 property-list sentinel".to_string(),
            ));
        }

        let declared_total = reader.read_i32_le()?;

        let mut result = Vec::with_capacity(headers.len());
        let mut consumed_total = 0i32;

        for header in &headers {
            let mut items = Vec::with_capacity(header.count.max(0) as usize);
            for _ in 0..header.count {
                items.push(read_string(&mut reader)?);
            }
            consumed_total += header.count;
            result.push((header.name.clone(), items));
        }

        if consumed_total != declared_total {
            log::warn!(
                "property stream declared {declared_total} total properties but headers sum to {consumed_total}; keeping the decoded result"
            );
        }

        return Ok(result);
    }
}

fn read_headers(reader: &mut ByteReader) -> Result<Vec<Header>, MaxDumpError> {
    let mut headers = Vec::new();

    loop {
        let mark_pos = reader.tell();
        let candidate = reader.read(4)?;

        if candidate != HEADER_MARKER {
            reader.seek(mark_pos);
            break;
        }

        let name = read_string(reader)?;

        let delim = reader.read(4)?;
        if delim != HEADER_DELIM {
            return Err(MaxDumpError::MalformedProperties(format!(
                "expected 0x03000000 delimiter after header '{name}'"
            )));
        }

        let count = reader.read_i32_le()?;
        headers.push(Header { name, count });
    }

    return Ok(headers);
}

fn read_string(reader: &mut ByteReader) -> Result<String, MaxDumpError> {
    let len = reader.read_i32_le()?;
    if len < 0 {
        return Err(MaxDumpError::MalformedProperties(format!(
            "negative string length: {len}"
        )));
    }

    let bytes = reader.read(len as usize)?;
    let nul_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

    return String::from_utf8(bytes[..nul_pos].to_vec())
        .map_err(|e| MaxDumpError::MalformedProperties(format!("invalid utf-8 property string: {e}")));
}

fn find_marker(buf: &[u8], marker: &[u8; 4]) -> Option<usize> {
    if buf.len() < marker.len() {
        return None;
    }

    return buf.windows(marker.len()).position(|w| w == marker);
}
