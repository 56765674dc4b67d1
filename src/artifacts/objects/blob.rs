//! Blob object
//!
//! Blobs store file content. They contain only the raw file data, without
//! any metadata like filename or permissions (those are stored in trees).
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`
//! In memory: the content bytes and the file mode

use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, new)]
pub struct Blob {
    /// Raw file content
    content: Bytes,
    /// File mode (permissions)
    stat: FileMode,
}

impl Blob {
    pub fn mode(&self) -> &FileMode {
        &self.stat
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> Result<Bytes> {
        Ok(Bytes::from(self.object_type().frame(&self.content)))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}
