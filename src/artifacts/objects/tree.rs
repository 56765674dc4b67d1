//! Tree object
//!
//! Trees represent one directory level. They list the immediate children of
//! a directory, files (blobs) and subdirectories (other trees), along with
//! their names and modes.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are kept sorted by name in ascending byte order, so the digest of
//! a tree depends only on the directory contents and never on the order in
//! which the children were discovered.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{FormatError, Result};
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Cursor, Write};

/// One `(mode, name, digest)` triple of a tree
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub oid: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Insert a child; a later entry with the same name replaces the earlier one
    pub fn add_entry(&mut self, name: impl Into<String>, entry: TreeEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the content of a tree object (the bytes after the header)
    pub fn parse(content: &[u8]) -> Result<Self> {
        let malformed = |reason: &str| FormatError::InvalidObjectHeader(format!("tree {reason}"));

        let mut reader = Cursor::new(content);
        let mut tree = Tree::default();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader
                .read_until(b' ', &mut mode_bytes)
                .map_err(|_| malformed("mode"))?;
            if n == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(malformed("unexpected end in mode").into());
            }
            let mode = std::str::from_utf8(&mode_bytes)
                .map_err(|_| malformed("mode"))
                .and_then(|mode| EntryMode::try_from(mode).map_err(|_| malformed("mode")))?;

            // Read "name\0"
            name_bytes.clear();
            reader
                .read_until(b'\0', &mut name_bytes)
                .map_err(|_| malformed("name"))?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(malformed("unexpected end in name").into());
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| malformed("name"))?
                .to_owned();

            let oid = ObjectId::read_h40_from(&mut reader)
                .map_err(|_| malformed("unexpected end in object id"))?;

            tree.add_entry(name, TreeEntry::new(mode, oid));
        }

        Ok(tree)
    }
}

impl FromIterator<(String, TreeEntry)> for Tree {
    fn from_iter<I: IntoIterator<Item = (String, TreeEntry)>>(iter: I) -> Self {
        Tree {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content_bytes = Vec::new();

        for (name, entry) in &self.entries {
            write!(content_bytes, "{:o} {}", entry.mode.as_u32(), name)
                .and_then(|_| content_bytes.write_all(&[0]))
                .and_then(|_| entry.oid.write_h40_to(&mut content_bytes))
                .map_err(|source| crate::errors::Error::io(name.as_str(), source))?;
        }

        Ok(Bytes::from(self.object_type().frame(&content_bytes)))
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;

    fn oid(hex: &str) -> ObjectId {
        ObjectId::try_parse(hex.to_string()).unwrap()
    }

    #[test]
    fn empty_tree_has_the_well_known_digest() {
        assert_eq!(
            Tree::default().object_id().unwrap().as_ref(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn entries_are_serialized_in_name_order() {
        let hello = oid("b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
        let nested = oid("c64bf409eb6421cd3d3c349ab8f337b4e4991f41");

        let mut tree = Tree::default();
        tree.add_entry("b", TreeEntry::new(EntryMode::Directory, nested.clone()));
        tree.add_entry("a.txt", TreeEntry::new(FileMode::Regular.into(), hello.clone()));

        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(&hello.to_raw());
        expected.extend_from_slice(b"40000 b\0");
        expected.extend_from_slice(&nested.to_raw());

        assert_eq!(
            tree.serialize().unwrap(),
            Bytes::from(ObjectType::Tree.frame(&expected))
        );
        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "6eb73f435afc727a3c937c842d7941465d20b129"
        );
    }

    #[test]
    fn serialized_content_parses_back() {
        let tree: Tree = [
            (
                "run.sh".to_string(),
                TreeEntry::new(FileMode::Executable.into(), ObjectId::hash(b"x")),
            ),
            (
                "src".to_string(),
                TreeEntry::new(EntryMode::Directory, ObjectId::hash(b"y")),
            ),
        ]
        .into_iter()
        .collect();

        let framed = tree.serialize().unwrap();
        let mut reader = Cursor::new(framed.as_ref());
        let (object_type, size) = ObjectType::parse_header(&mut reader).unwrap();
        let content = &framed[reader.position() as usize..];

        assert_eq!(object_type, ObjectType::Tree);
        assert_eq!(size, content.len());
        assert_eq!(Tree::parse(content).unwrap(), tree);
    }

    #[test]
    fn truncated_tree_content_is_rejected() {
        assert!(Tree::parse(b"100644 a.txt\0\x01\x02").is_err());
    }
}
