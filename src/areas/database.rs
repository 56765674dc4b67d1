use crate::artifacts::database::compression;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, FormatError, Result};
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store rooted at `<meta>/objects`
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Store any object; the digest is computed over exactly the bytes that
    /// get compressed
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let framed = object.serialize()?;
        self.store_framed(&framed)
    }

    /// Frame `content` as a blob and store it
    pub fn store_blob(&self, content: Bytes) -> Result<ObjectId> {
        self.store(&Blob::new(content, Default::default()))
    }

    /// Store an already framed `tree <len>\0...` payload
    pub fn store_tree(&self, framed: &[u8]) -> Result<ObjectId> {
        let (object_type, size) = ObjectType::parse_header(&mut Cursor::new(framed))?;
        let header_len = format!("{object_type} {size}\0").len();

        if object_type != ObjectType::Tree || header_len + size != framed.len() {
            return Err(FormatError::InvalidObjectHeader(format!(
                "expected a framed tree of {} bytes",
                framed.len()
            ))
            .into());
        }

        self.store_framed(framed)
    }

    fn store_framed(&self, framed: &[u8]) -> Result<ObjectId> {
        let object_id = ObjectId::hash(framed);
        let object_path = self.object_path(&object_id);

        // identical content always hashes to the same path, so an existing
        // object never needs rewriting
        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::io(&object_path, std::io::ErrorKind::NotFound.into()))?;
        std::fs::create_dir_all(object_dir).map_err(|e| Error::io(object_dir, e))?;

        self.write_object(&object_path, framed)?;
        tracing::debug!(oid = %object_id, bytes = framed.len(), "object written");

        Ok(object_id)
    }

    /// Read an object back as its framed payload
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(object_id);
        let object_content =
            std::fs::read(&object_path).map_err(|e| Error::io(&object_path, e))?;

        compression::decompress(&object_content)
    }

    fn write_object(&self, object_path: &Path, framed: &[u8]) -> Result<()> {
        // compress before touching the disk so a failure leaves nothing behind
        let object_content = compression::compress(framed)?;

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::io(object_path, std::io::ErrorKind::NotFound.into()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let written = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .and_then(|mut file| {
                file.write_all(&object_content)?;
                file.sync_all()
            })
            .map_err(|e| Error::io(&temp_object_path, e));

        // rename the temp file to the object file to make it atomic
        let renamed = written.and_then(|_| {
            std::fs::rename(&temp_object_path, object_path).map_err(|e| Error::io(object_path, e))
        });

        if renamed.is_err() {
            let _ = std::fs::remove_file(&temp_object_path);
        }

        renamed
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
