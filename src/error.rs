use std::fmt;

/*
 * Error taxonomy for the chunk parser, stream decoders and linker.
 * Every fallible operation in this crate returns Result<T, MaxDumpError>;
 * nothing here is retried or recovered except the one allowance in
 * CameraQuery for a Node missing its reference-array child.
 */
#[derive(Debug)]
pub enum MaxDumpError {
    Io(std::io::Error),
    UnknownStream {
        name: String,
        available: Vec<String>,
    },
    ShortRead {
        wanted: usize,
        available: usize,
    },
    MalformedChunk(String),
    MalformedProperties(String),
    UnknownDllTag(u16),
    MalformedDllEntry(String),
    MalformedClassEntry(String),
    InvalidDllIndex(i32),
    UnknownClassIndex(u16),
    NoNodeClass,
    NodeMissingName,
}

impl fmt::Display for MaxDumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDumpError::Io(e) => write!(f, "I/O error: {e}"),
            MaxDumpError::UnknownStream { name, available } => write!(
                f,
                "unknown stream '{name}', available streams: {}",
                available.join(", ")
            ),
            MaxDumpError::ShortRead { wanted, available } => write!(
                f,
                "short read: wanted {wanted} bytes, only {available} available"
            ),
            MaxDumpError::MalformedChunk(msg) => write!(f, "malformed chunk: {msg}"),
            MaxDumpError::MalformedProperties(msg) => write!(f, "malformed property stream: {msg}"),
            MaxDumpError::UnknownDllTag(idn) => write!(f, "unknown DllDirectory tag: {idn:#x}"),
            MaxDumpError::MalformedDllEntry(msg) => write!(f, "malformed dll entry: {msg}"),
            MaxDumpError::MalformedClassEntry(msg) => write!(f, "malformed class entry: {msg}"),
            MaxDumpError::InvalidDllIndex(i) => write!(f, "invalid dll index: {i}"),
            MaxDumpError::UnknownClassIndex(i) => write!(f, "unknown class index: {i}"),
            MaxDumpError::NoNodeClass => write!(f, "ClassDirectory3 has no 'Node' class entry"),
            MaxDumpError::NodeMissingName => write!(f, "Node scene object is missing its 0x962 name child"),
        }
    }
}

impl std::error::Error for MaxDumpError {}

impl From<std::io::Error> for MaxDumpError {
    fn from(e: std::io::Error) -> MaxDumpError {
        MaxDumpError::Io(e)
    }
}
