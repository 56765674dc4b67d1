use derive_new::new;
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

impl FileSpec {
    /// Path relative to `root`, `/`-separated
    pub fn relative_to(&self, root: &Path) -> String {
        self.path
            .strip_prefix(root)
            .unwrap_or_else(|_| panic!("{:?} is not under {:?}", self.path, root))
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

pub fn write_file(file_spec: &FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Write `files_count` files with random names and contents directly in `dir`
pub fn write_generated_files(dir: &Path, files_count: usize) -> Vec<FileSpec> {
    (0..files_count)
        .map(|i| {
            // the suffix keeps names unique when the generator repeats a word
            let file_name = format!("{}_{i}.txt", Word().fake::<String>());
            let file_content = Words(5..10).fake::<Vec<String>>().join(" ");

            let file_spec = FileSpec::new(dir.join(file_name), file_content);
            write_file(&file_spec);

            file_spec
        })
        .collect()
}

/// Write a random directory tree `depth` levels deep under `dir`
pub fn write_generated_directory(dir: &Path, files_count: usize, depth: usize) -> Vec<FileSpec> {
    let mut files = write_generated_files(dir, files_count);

    if depth > 0 {
        let nested = dir.join(format!("dir_{}", Word().fake::<String>()));
        files.extend(write_generated_directory(&nested, files_count, depth - 1));
    }

    files
}
