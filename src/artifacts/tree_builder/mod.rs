//! Building tree objects for a whole working tree
//!
//! A build runs in two phases:
//!
//! 1. **Collection**: workspace entries are folded into a [`DirectoryTree`].
//!    Each file is framed as a blob, hashed and stored as it arrives.
//! 2. **Hashing**: the hierarchy is resolved bottom-up; every directory
//!    becomes a tree object with its entries sorted by name.
//!
//! The root digest is the only result a caller needs. Any error aborts the
//! build; blobs stored before the failure stay in the store unreferenced.

pub mod directory_node;

use crate::areas::database::Database;
use crate::areas::workspace::{WorkspaceEntry, WorkspaceEntryKind};
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use derive_new::new;
use directory_node::DirectoryTree;

#[derive(Debug, new)]
pub struct TreeBuilder<'r> {
    database: &'r Database,
}

impl TreeBuilder<'_> {
    /// Phase 1: fold a pre-order stream of workspace entries into a hierarchy
    pub fn collect(
        &self,
        entries: impl IntoIterator<Item = Result<WorkspaceEntry>>,
    ) -> Result<DirectoryTree> {
        let mut directory = DirectoryTree::new();

        for entry in entries {
            let WorkspaceEntry { path, kind } = entry?;

            match kind {
                WorkspaceEntryKind::Directory => {
                    tracing::debug!(%path, "collected directory");
                    directory.insert_directory(&path)?;
                }
                WorkspaceEntryKind::File { content, metadata } => {
                    let mode = FileMode::try_from(metadata.mode)?;
                    let oid = self.database.store(&Blob::new(content, mode))?;
                    tracing::debug!(%path, %oid, "collected file");
                    directory.insert_file(&path, mode, oid)?;
                }
            }
        }

        Ok(directory)
    }

    /// Phase 2: store every tree object and return the root digest
    pub fn write(&self, directory: &DirectoryTree) -> Result<ObjectId> {
        directory.write_trees(&mut |tree: &Tree| self.database.store(tree))
    }

    /// Run both phases over a workspace walk
    pub fn build(
        &self,
        entries: impl IntoIterator<Item = Result<WorkspaceEntry>>,
    ) -> Result<ObjectId> {
        let directory = self.collect(entries)?;
        let root = self.write(&directory)?;
        tracing::info!(%root, nodes = directory.len(), "tree built");

        Ok(root)
    }

    /// Build the same canonical tree from staged entries instead of the disk
    ///
    /// Directories are implied by the entry paths; blobs must already be in
    /// the store.
    pub fn build_from_index<'e>(
        &self,
        entries: impl IntoIterator<Item = &'e IndexEntry>,
    ) -> Result<ObjectId> {
        let mut directory = DirectoryTree::new();

        for entry in entries {
            let mode = FileMode::try_from(entry.metadata.mode)?;
            directory.insert_file_with_parents(&entry.path, mode, entry.oid.clone())?;
        }

        let root = self.write(&directory)?;
        tracing::info!(%root, nodes = directory.len(), "tree built from index");

        Ok(root)
    }
}
