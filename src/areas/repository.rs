use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::layout::RepositoryLayout;
use crate::areas::workspace::Workspace;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;

/// One working tree and its metadata directory
///
/// Every path comes from the [`RepositoryLayout`] given at construction;
/// commands write their user-facing output to `writer`.
pub struct Repository {
    layout: RepositoryLayout,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Index,
    database: Database,
    workspace: Workspace,
}

impl Repository {
    pub fn new(layout: RepositoryLayout, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let root = layout.root();
        if !root.exists() {
            std::fs::create_dir_all(root)
                .with_context(|| format!("Failed to create {}", root.display()))?;
        }

        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", root.display()))?;
        let layout = RepositoryLayout::with_metadata_dir(root, layout.metadata_dir_name());

        let index = Index::new(layout.index_path().into_boxed_path());
        let database = Database::new(layout.objects_path().into_boxed_path());
        let workspace = Workspace::new(
            layout.root().to_path_buf().into_boxed_path(),
            layout.metadata_dir_name(),
        );

        Ok(Repository {
            layout,
            writer: RefCell::new(writer),
            index,
            database,
            workspace,
        })
    }

    pub fn path(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &RepositoryLayout {
        &self.layout
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Fail unless `init` has already created the metadata directory
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        let metadata_path = self.layout.metadata_path();
        anyhow::ensure!(
            metadata_path.is_dir(),
            "not a gitgood repository: {} does not exist",
            metadata_path.display()
        );

        Ok(())
    }
}
