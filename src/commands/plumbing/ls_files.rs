use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use anyhow::Context;

impl Repository {
    /// Load and return every staged entry, in path order
    pub fn read_index(&mut self) -> anyhow::Result<Vec<IndexEntry>> {
        self.ensure_initialized()?;
        self.index_mut()
            .rehydrate()
            .context("Failed to load the index")?;

        Ok(self.index().entries().cloned().collect())
    }

    /// Print staged paths; with `stage`, also their mode and digest
    pub fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        for entry in self.read_index()? {
            if stage {
                writeln!(
                    self.writer(),
                    "{} {} 0\t{}",
                    entry.metadata.mode.as_str(),
                    entry.oid,
                    entry.path
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.path)?;
            }
        }

        Ok(())
    }
}
