use crate::errors::{Error, FormatError, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
        }
    }

    /// Frame `content` as `"<type> <len>\0<content>"`
    pub fn frame(&self, content: &[u8]) -> Vec<u8> {
        let header = format!("{} {}\0", self.as_str(), content.len());

        let mut framed = Vec::with_capacity(header.len() + content.len());
        framed.extend_from_slice(header.as_bytes());
        framed.extend_from_slice(content);
        framed
    }

    /// Consume a `"<type> <len>\0"` header from the reader
    ///
    /// Returns the object type and the declared content length.
    pub fn parse_header(data_reader: &mut impl BufRead) -> Result<(ObjectType, usize)> {
        let invalid = |reason: &str| Error::from(FormatError::InvalidObjectHeader(reason.into()));

        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|_| invalid("unreadable type"))?;
        if object_type.pop() != Some(b' ') {
            return Err(invalid("missing type separator"));
        }
        let object_type = std::str::from_utf8(&object_type).map_err(|_| invalid("type"))?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|_| invalid("unreadable size"))?;
        if size.pop() != Some(b'\0') {
            return Err(invalid("missing size terminator"));
        }
        let size = std::str::from_utf8(&size)
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| invalid("size"))?;

        Ok((ObjectType::try_from(object_type)?, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            other => Err(FormatError::InvalidObjectHeader(format!("unknown type {other:?}")).into()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
