//! Staging index
//!
//! The index records which files are queued for the next snapshot, along
//! with their stat metadata and blob digests.
//!
//! ## Data Structures
//!
//! - `entries`: Maps file paths to their index entries, in byte order
//! - `children`: Maps directory paths to the entries beneath them, used to
//!   drop conflicting entries when a file replaces a directory or vice versa

use crate::artifacts::index::codec;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.gitgood/index`)
    path: Box<Path>,
    /// Staged files mapped by path
    entries: BTreeMap<String, IndexEntry>,
    /// Directory hierarchy for efficient parent-child lookups
    children: BTreeMap<String, BTreeSet<String>>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    /// Load the index from disk
    ///
    /// A missing or empty file is an empty index. Otherwise the file must
    /// decode cleanly and its trailing checksum must match.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)
            .map_err(|e| self.io_error(e))?;

        let mut data = Vec::new();
        lock.deref_mut()
            .read_to_end(&mut data)
            .map_err(|e| self.io_error(e))?;
        drop(lock);

        if data.is_empty() {
            return Ok(());
        }

        for entry in codec::decode_verified(&data)? {
            self.store_entry(entry);
        }

        Ok(())
    }

    /// Stage `entry`, replacing any entry with the same path
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);

        self.changed = true;
    }

    /// Remove entries that can no longer coexist with `entry`
    ///
    /// A file at `a/b` evicts a file at `a`, and evicts everything that was
    /// staged under `a/b/`.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.path);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.path.clone());
        }

        self.entries.insert(entry.path.clone(), entry);
    }

    fn remove_children(&mut self, path: &str) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &str) {
        let Some(entry) = self.entries.remove(path) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }

    /// Encode every entry and replace the index file
    ///
    /// The bytes go to `<index>.lock` first, held under an exclusive lock,
    /// and are renamed over the index once fully written.
    pub fn write_updates(&mut self) -> Result<()> {
        let data = codec::encode(self.entries.values())?;
        let lock_path = self.lock_path();

        let written = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .and_then(|mut lock_file| {
                let mut lock = file_guard::lock(&mut lock_file, file_guard::Lock::Exclusive, 0, 1)?;
                lock.deref_mut().write_all(&data)?;
                lock.deref_mut().sync_all()
            })
            .map_err(|e| Error::io(&lock_path, e));

        let renamed = written.and_then(|_| {
            std::fs::rename(&lock_path, &self.path).map_err(|e| self.io_error(e))
        });

        if renamed.is_err() {
            let _ = std::fs::remove_file(&lock_path);
            return renamed;
        }

        tracing::info!(entries = self.entries.len(), "index written");
        self.changed = false;

        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut file_name = self.path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".lock");
        self.path.with_file_name(file_name)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::io(&*self.path, source)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::object_id::ObjectId;
    use crate::errors::FormatError;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn index(dir: &TempDir) -> Index {
        Index::new(dir.path().join("index").into_boxed_path())
    }

    fn entry(path: &str, content: &str) -> IndexEntry {
        IndexEntry::new(
            path.to_string(),
            ObjectId::hash(content.as_bytes()),
            EntryMetadata {
                mode: EntryMode::File(FileMode::Regular),
                size: content.len() as u32,
                ..Default::default()
            },
        )
    }

    fn paths(index: &Index) -> Vec<&str> {
        index.entries().map(|entry| entry.path.as_str()).collect()
    }

    #[rstest]
    fn missing_file_is_an_empty_index(temp_dir: TempDir) {
        let mut index = index(&temp_dir);

        index.rehydrate().unwrap();

        assert!(index.is_empty());
        assert!(!index.path().exists());
    }

    #[rstest]
    fn empty_file_is_an_empty_index(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        std::fs::write(index.path(), b"").unwrap();

        index.rehydrate().unwrap();

        assert!(index.is_empty());
    }

    #[rstest]
    fn written_entries_are_reloaded(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        index.add(entry("z.txt", "z"));
        index.add(entry("a/b.txt", "b"));
        index.write_updates().unwrap();
        assert!(!index.is_changed());

        let mut reloaded = Index::new(index.path().into());
        reloaded.rehydrate().unwrap();

        assert_eq!(paths(&reloaded), vec!["a/b.txt", "z.txt"]);
        assert_eq!(
            reloaded.entry_by_path("z.txt"),
            Some(&entry("z.txt", "z"))
        );
        assert!(!temp_dir.path().join("index.lock").exists());
    }

    #[rstest]
    fn staging_the_same_path_replaces_the_entry(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        index.add(entry("a.txt", "first"));
        index.add(entry("a.txt", "second"));

        assert_eq!(index.len(), 1);
        assert_eq!(
            index.entry_by_path("a.txt").map(|e| e.oid.clone()),
            Some(ObjectId::hash(b"second"))
        );
    }

    #[rstest]
    fn file_replaces_directory(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        index.add(entry("dir/a.txt", "a"));
        index.add(entry("dir/nested/b.txt", "b"));
        index.add(entry("other.txt", "o"));

        index.add(entry("dir", "now a file"));

        assert_eq!(paths(&index), vec!["dir", "other.txt"]);
    }

    #[rstest]
    fn directory_replaces_file(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        index.add(entry("dir", "a file"));

        index.add(entry("dir/a.txt", "a"));

        assert_eq!(paths(&index), vec!["dir/a.txt"]);
    }

    #[rstest]
    fn corrupted_file_is_rejected(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        index.add(entry("a.txt", "a"));
        index.write_updates().unwrap();

        let mut data = std::fs::read(index.path()).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xff;
        std::fs::write(index.path(), &data).unwrap();

        assert!(matches!(index.rehydrate(), Err(Error::Integrity { .. })));
    }

    #[rstest]
    fn foreign_file_is_not_an_index(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        std::fs::write(index.path(), b"PACK and more bytes").unwrap();

        assert!(matches!(
            index.rehydrate(),
            Err(Error::Format(FormatError::NotAnIndex { .. }))
        ));
    }

    #[rstest]
    fn stale_lock_file_blocks_writing(temp_dir: TempDir) {
        let mut index = index(&temp_dir);
        std::fs::write(temp_dir.path().join("index.lock"), b"").unwrap();
        index.add(entry("a.txt", "a"));

        assert!(matches!(index.write_updates(), Err(Error::Io { .. })));
        assert!(!index.path().exists());
    }
}
