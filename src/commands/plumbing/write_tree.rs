use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::tree_builder::TreeBuilder;
use anyhow::Context;

impl Repository {
    /// Build and store the tree of the working directory, or of the index
    /// when `staged` is set, and return its root digest
    pub fn build_tree(&mut self, staged: bool) -> anyhow::Result<ObjectId> {
        self.ensure_initialized()?;

        if staged {
            self.index_mut()
                .rehydrate()
                .context("Failed to load the index")?;

            return TreeBuilder::new(self.database())
                .build_from_index(self.index().entries())
                .context("Failed to build the tree from the index");
        }

        TreeBuilder::new(self.database())
            .build(self.workspace().walk())
            .context("Failed to build the tree from the working directory")
    }

    pub fn write_tree(&mut self, staged: bool) -> anyhow::Result<()> {
        let root = self.build_tree(staged)?;
        writeln!(self.writer(), "{root}")?;

        Ok(())
    }
}
