//! On-disk layout of a repository
//!
//! Every path the repository touches is derived from the working-tree root
//! and the name of the metadata directory, so several repositories can live
//! in one process.

use std::path::{Path, PathBuf};

/// Default name of the metadata directory inside the working tree
pub const DEFAULT_METADATA_DIR: &str = ".gitgood";

/// Environment variable overriding the metadata directory name
pub const METADATA_DIR_ENV: &str = "GITGOOD_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLayout {
    root: PathBuf,
    metadata_dir_name: String,
}

impl RepositoryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_metadata_dir(root, DEFAULT_METADATA_DIR)
    }

    pub fn with_metadata_dir(root: impl Into<PathBuf>, metadata_dir_name: impl Into<String>) -> Self {
        RepositoryLayout {
            root: root.into(),
            metadata_dir_name: metadata_dir_name.into(),
        }
    }

    /// Working-tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_dir_name(&self) -> &str {
        &self.metadata_dir_name
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(&self.metadata_dir_name)
    }

    pub fn objects_path(&self) -> PathBuf {
        self.metadata_path().join("objects")
    }

    pub fn index_path(&self) -> PathBuf {
        self.metadata_path().join("index")
    }

    pub fn refs_path(&self) -> PathBuf {
        self.metadata_path().join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    pub fn head_path(&self) -> PathBuf {
        self.metadata_path().join("HEAD")
    }

    pub fn config_path(&self) -> PathBuf {
        self.metadata_path().join("config")
    }
}
