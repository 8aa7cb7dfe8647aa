use std::io::Read;
use std::path::Path;

use crate::error::MaxDumpError;

/*
 * Opens a max file as a Microsoft Compound File Binary container and
 * yields the full bytes of a named stream. Per the resource model, a
 * single call opens the file, reads the stream fully into memory, and
 * drops the container again -- 3ds Max may hold the file memory-mapped
 * and does not tolerate a long-lived open handle from another process.
 */
pub struct CfbAccess;

impl CfbAccess {
    pub fn open_stream(path: &Path, stream_name: &str) -> Result<Vec<u8>, MaxDumpError> {
        let mut container = cfb::open(path)?;

        let wanted = normalize_name(stream_name);

        let entry_path = container
            .walk()
            .find(|entry| entry.is_stream() && normalize_name(&entry.name()) == wanted)
            .map(|entry| entry.path().to_path_buf());

        let entry_path = match entry_path {
            Some(p) => p,
            None => {
                return Err(MaxDumpError::UnknownStream {
                    name: stream_name.to_string(),
                    available: list_stream_names(&mut container),
                });
            }
        };

        let mut stream = container.open_stream(&entry_path)?;
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;

        return Ok(buf);
    }
}

fn normalize_name(name: &str) -> String {
    name.trim_start_matches('\u{5}').to_string()
}

fn list_stream_names(container: &mut cfb::CompoundFile<std::fs::File>) -> Vec<String> {
    return container
        .walk()
        .filter(|entry| entry.is_stream())
        .map(|entry| entry.name().to_string())
        .collect();
}
