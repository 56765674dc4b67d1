use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;

const DEFAULT_BRANCH: &str = "master";

const DEFAULT_CONFIG: &str = "[core]\n\
    \trepositoryformatversion = 0\n\
    \tfilemode = true\n\
    \tbare = false\n\
    \tlogallrefupdates = true\n";

impl Repository {
    pub fn init(&mut self) -> anyhow::Result<()> {
        let layout = self.layout().clone();

        fs::create_dir_all(layout.objects_path())
            .context("Failed to create the objects directory")?;

        fs::create_dir_all(layout.heads_path())
            .context("Failed to create the refs/heads directory")?;

        fs::write(
            layout.head_path(),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )
        .context("Failed to create initial HEAD reference")?;

        fs::write(layout.config_path(), DEFAULT_CONFIG)
            .context("Failed to write the repository config")?;

        writeln!(
            self.writer(),
            "Initialized empty gitgood repository in {}",
            layout.metadata_path().display()
        )?;

        Ok(())
    }
}
