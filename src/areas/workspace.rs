use crate::artifacts::index::index_entry::EntryMetadata;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Names never descended into, besides the repository's own metadata directory
const IGNORED_PATHS: [&str; 1] = [".git"];

/// One item produced by the working-tree walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntry {
    /// Path relative to the workspace root, `/`-separated
    pub path: String,
    pub kind: WorkspaceEntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEntryKind {
    Directory,
    /// A regular file, its content already read
    File {
        content: Bytes,
        metadata: EntryMetadata,
    },
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    metadata_dir_name: String,
}

impl Workspace {
    pub fn new(path: Box<Path>, metadata_dir_name: impl Into<String>) -> Self {
        Workspace {
            path,
            metadata_dir_name: metadata_dir_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walk the whole working tree, see [`Workspace::walk_from`]
    pub fn walk(&self) -> impl Iterator<Item = Result<WorkspaceEntry>> + '_ {
        self.walk_from(&self.path)
    }

    /// Lazily walk the tree under `start`, parents before their children
    ///
    /// The sequence is single-pass. Every item is fully formed when yielded:
    /// file content is read and a failure to read it is the item's error.
    /// The metadata directory and `.git` are skipped together with everything
    /// beneath them. Symbolic links and other special files are skipped.
    pub fn walk_from<'w>(
        &'w self,
        start: &Path,
    ) -> impl Iterator<Item = Result<WorkspaceEntry>> + 'w {
        WalkDir::new(start)
            .min_depth(usize::from(start == &*self.path))
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry.path()))
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(error) => {
                        let path = error.path().map(Path::to_path_buf).unwrap_or_default();
                        return Some(Err(Error::io(path, io::Error::from(error))));
                    }
                };

                let file_type = entry.file_type();
                if !file_type.is_dir() && !file_type.is_file() {
                    tracing::debug!(path = %entry.path().display(), "skipping special file");
                    return None;
                }

                Some(self.load_entry(entry.path(), file_type.is_dir()))
            })
    }

    fn load_entry(&self, absolute_path: &Path, is_dir: bool) -> Result<WorkspaceEntry> {
        let path = self.relative_path(absolute_path)?;

        let kind = if is_dir {
            WorkspaceEntryKind::Directory
        } else {
            WorkspaceEntryKind::File {
                content: self.read_file(&path)?,
                metadata: self.stat_file(&path)?,
            }
        };

        Ok(WorkspaceEntry { path, kind })
    }

    /// Relative, `/`-separated form of a path under the workspace root
    pub fn relative_path(&self, absolute_path: &Path) -> Result<String> {
        let invalid = |reason: &str| {
            Error::io(
                absolute_path,
                io::Error::new(io::ErrorKind::InvalidInput, reason.to_string()),
            )
        };

        let relative = absolute_path
            .strip_prefix(&*self.path)
            .map_err(|_| invalid("path is outside the workspace"))?;

        relative
            .components()
            .map(|component| match component {
                Component::Normal(name) => name
                    .to_str()
                    .ok_or_else(|| invalid("path is not valid UTF-8")),
                _ => Err(invalid("path is not normalized")),
            })
            .collect::<Result<Vec<_>>>()
            .map(|names| names.join("/"))
    }

    /// Whether `path` lies in the metadata directory or another skipped one
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.strip_prefix(&*self.path)
            .unwrap_or(path)
            .components()
            .any(|component| match component {
                Component::Normal(name) => {
                    let name = name.to_string_lossy();
                    name == self.metadata_dir_name.as_str() || IGNORED_PATHS.contains(&name.as_ref())
                }
                _ => false,
            })
    }

    pub fn read_file(&self, file_path: impl AsRef<Path>) -> Result<Bytes> {
        let file_path = self.path.join(file_path);

        std::fs::read(&file_path)
            .map(Bytes::from)
            .map_err(|e| Error::io(file_path, e))
    }

    pub fn stat_file(&self, file_path: impl AsRef<Path>) -> Result<EntryMetadata> {
        let file_path = self.path.join(file_path);
        let metadata = std::fs::metadata(&file_path).map_err(|e| Error::io(&file_path, e))?;

        (file_path.as_path(), metadata).try_into()
    }

    /// Absolute form of a user supplied path, relative paths resolved against `base`
    pub fn absolute_path(&self, base: &Path, path: &Path) -> Result<PathBuf> {
        let joined = base.join(path);
        joined.canonicalize().map_err(|e| Error::io(joined, e))
    }
}
