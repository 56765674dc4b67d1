use crate::areas::repository::Repository;
use crate::areas::workspace::WorkspaceEntryKind;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

impl Repository {
    /// Stage every file under `paths`, directories expanded recursively
    ///
    /// The index is loaded once and written once, after every file has
    /// been stored.
    pub fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;
        self.index_mut()
            .rehydrate()
            .context("Failed to load the index")?;

        let mut staged = Vec::new();
        for path in paths {
            let absolute_path = self
                .workspace()
                .absolute_path(self.path(), Path::new(path))
                .with_context(|| format!("pathspec '{path}' did not match any files"))?;
            anyhow::ensure!(
                !self.workspace().is_ignored(&absolute_path),
                "pathspec '{path}' is inside the repository metadata directory"
            );

            let files = self
                .workspace()
                .walk_from(&absolute_path)
                .filter_map(|entry| match entry {
                    Ok(entry) => match entry.kind {
                        WorkspaceEntryKind::File { content, metadata } => {
                            Some(Ok((entry.path, content, metadata)))
                        }
                        WorkspaceEntryKind::Directory => None,
                    },
                    Err(error) => Some(Err(error)),
                })
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Failed to read '{path}'"))?;

            staged.extend(files);
        }

        for (path, content, metadata) in staged {
            let oid = self.stage_entry(path, content, metadata)?;
            writeln!(self.writer(), "{oid}")?;
        }

        self.index_mut()
            .write_updates()
            .context("Failed to write the index")?;

        Ok(())
    }

    /// Store one file as a blob and stage it on top of the current index
    ///
    /// `path` is relative to the repository root. The index is loaded from
    /// disk and written back with the new entry.
    pub fn stage_file(&mut self, path: &str) -> anyhow::Result<ObjectId> {
        self.ensure_initialized()?;
        anyhow::ensure!(
            !self.workspace().is_ignored(Path::new(path)),
            "pathspec '{path}' is inside the repository metadata directory"
        );
        self.index_mut()
            .rehydrate()
            .context("Failed to load the index")?;

        let content = self.workspace().read_file(path)?;
        let metadata = self.workspace().stat_file(path)?;
        let oid = self.stage_entry(path.to_string(), content, metadata)?;

        self.index_mut()
            .write_updates()
            .context("Failed to write the index")?;

        Ok(oid)
    }

    fn stage_entry(
        &mut self,
        path: String,
        content: Bytes,
        metadata: EntryMetadata,
    ) -> anyhow::Result<ObjectId> {
        let mode = FileMode::try_from(metadata.mode)?;
        let oid = self
            .database()
            .store(&Blob::new(content, mode))
            .with_context(|| format!("Failed to store '{path}'"))?;

        self.index_mut()
            .add(IndexEntry::new(path, oid.clone(), metadata));

        Ok(oid)
    }
}
