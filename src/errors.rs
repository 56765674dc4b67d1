//! Typed failures of the object store, index codec and tree builder
//!
//! Core operations return [`Result`]; the command layer wraps them in
//! `anyhow` with the context of the user-facing operation.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed index or object bytes
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The trailing digest of the index does not match its content
    #[error("index checksum mismatch: stored {expected}, computed {actual}")]
    Integrity { expected: String, actual: String },

    /// A filesystem operation failed on `path`
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The zlib stream could not be written or finalized
    #[error("unable to compress object content: {0}")]
    Compression(#[source] std::io::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("not an index file: bad signature {found:?}")]
    NotAnIndex { found: Vec<u8> },

    #[error("unexpected end of index at offset {offset}: {needed} more bytes needed")]
    Truncated { offset: usize, needed: usize },

    #[error("unsupported index file version: {0}")]
    UnsupportedVersion(u32),

    #[error("path length field {0:#06x} overflows the 12-bit length")]
    PathLengthOverflow(u16),

    #[error("missing null terminator after entry path at offset {0}")]
    MissingTerminator(usize),

    #[error("entry path is not valid UTF-8 at offset {0}")]
    InvalidPath(usize),

    #[error("invalid entry mode {0:o}")]
    InvalidMode(u32),

    #[error("index entries out of order: {previous:?} is not before {current:?}")]
    Unsorted { previous: String, current: String },

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("{0:?} was visited before its parent directory")]
    MissingParent(String),

    #[error("{0:?} names the same entry as a file and a directory")]
    PathConflict(String),

    #[error("{0:?} has an empty path component")]
    EmptyPathComponent(String),

    #[error("invalid object header: {0}")]
    InvalidObjectHeader(String),
}
