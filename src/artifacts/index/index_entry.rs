//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path (repository-relative, `/`-separated)
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! ```text
//! ctime sec | ctime nsec | mtime sec | mtime nsec | dev | ino | mode | uid | gid | size
//!   (ten 4-byte big-endian integers, 40 bytes)
//! object id (20 raw bytes)
//! path length (2 bytes, clamped to 0xFFF)
//! path bytes, one NUL, then NUL padding to a multiple of 8
//! ```

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::{ENTRY_BLOCK, ENTRY_FIXED_SIZE, MAX_PATH_SIZE};
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{FormatError, Result};
use byteorder::{NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Index entry representing a staged file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub path: String,
    /// Digest of the framed file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Ancestor directories of the entry, outermost first
    ///
    /// `a/b/c` yields `["a", "a/b"]`.
    pub fn parent_dirs(&self) -> Vec<&str> {
        self.path
            .match_indices('/')
            .map(|(position, _)| &self.path[..position])
            .collect()
    }

    /// Total encoded size, terminator and padding included
    pub fn encoded_len(&self) -> usize {
        padded_len(self.path.len())
    }

    /// Whether the 12-bit path length field cannot hold the real length
    pub fn is_path_length_clamped(&self) -> bool {
        self.path.len() > MAX_PATH_SIZE
    }

    fn path_length_field(&self) -> u16 {
        self.path.len().min(MAX_PATH_SIZE) as u16
    }

    /// Decode one entry starting at the reader's position
    pub(crate) fn parse(reader: &mut Checksum) -> Result<Self> {
        let ctime = reader.read_u32()?;
        let ctime_nsec = reader.read_u32()?;
        let mtime = reader.read_u32()?;
        let mtime_nsec = reader.read_u32()?;
        let dev = reader.read_u32()?;
        let ino = reader.read_u32()?;
        let mode = EntryMode::try_from(reader.read_u32()?)?;
        let uid = reader.read_u32()?;
        let gid = reader.read_u32()?;
        let size = reader.read_u32()?;
        let oid = ObjectId::read_h40_from(&mut reader.read(RAW_OBJECT_ID_LENGTH)?)
            .map_err(|_| FormatError::InvalidObjectId("short object id".into()))?;

        let path_length = reader.read_u16()?;
        if path_length as usize > MAX_PATH_SIZE {
            return Err(FormatError::PathLengthOverflow(path_length).into());
        }

        let path_offset = reader.offset();
        let path_bytes = if path_length as usize == MAX_PATH_SIZE {
            // the length was clamped on write, the terminator marks the end
            let end = reader
                .remaining()
                .iter()
                .skip(MAX_PATH_SIZE)
                .position(|&b| b == 0)
                .map(|position| position + MAX_PATH_SIZE)
                .ok_or(FormatError::MissingTerminator(path_offset))?;
            reader.read(end)?
        } else {
            reader.read(path_length as usize)?
        };

        if reader.read(1)? != [0] {
            return Err(FormatError::MissingTerminator(reader.offset() - 1).into());
        }

        let path = std::str::from_utf8(path_bytes)
            .map_err(|_| FormatError::InvalidPath(path_offset))?
            .to_string();

        let padding = padded_len(path.len()) - (ENTRY_FIXED_SIZE + path.len() + 1);
        reader.skip(padding)?;

        Ok(IndexEntry {
            path,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
        })
    }
}

/// Entry length (fixed fields, path, terminator) rounded up to `ENTRY_BLOCK`
pub fn padded_len(path_len: usize) -> usize {
    let unpadded = ENTRY_FIXED_SIZE + path_len + 1;
    unpadded.div_ceil(ENTRY_BLOCK) * ENTRY_BLOCK
}

/// File metadata stored in index entries
///
/// All fields are stored as 32-bit values; wider values taken from `stat`
/// are truncated to their low 32 bits.
///
/// ## Timestamps
///
/// - `ctime`: File status change time (inode modification)
/// - `mtime`: File content modification time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: u32,
    /// Change time nanoseconds
    pub ctime_nsec: u32,
    /// Modification time (seconds since Unix epoch)
    pub mtime: u32,
    /// Modification time nanoseconds
    pub mtime_nsec: u32,
    /// Device ID
    pub dev: u32,
    /// Inode number
    pub ino: u32,
    /// File mode (permissions and type)
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u32,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let mut entry_bytes = Vec::with_capacity(self.encoded_len());

        for field in [
            self.metadata.ctime,
            self.metadata.ctime_nsec,
            self.metadata.mtime,
            self.metadata.mtime_nsec,
            self.metadata.dev,
            self.metadata.ino,
            self.metadata.mode.as_u32(),
            self.metadata.uid,
            self.metadata.gid,
            self.metadata.size,
        ] {
            entry_bytes.extend_from_slice(&field.to_be_bytes());
        }
        entry_bytes.extend_from_slice(&self.oid.to_raw());
        // writes into a Vec cannot fail
        let _ = entry_bytes.write_u16::<NetworkEndian>(self.path_length_field());
        entry_bytes.extend_from_slice(self.path.as_bytes());

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        entry_bytes.resize(self.encoded_len(), 0);

        Ok(Bytes::from(entry_bytes))
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = crate::errors::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self> {
        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else if file_path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        })
    }
}
