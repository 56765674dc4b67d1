//! Command implementations, as `impl Repository` blocks
//!
//! - `plumbing`: Low-level commands (hash-object, ls-files, write-tree)
//! - `porcelain`: User-facing commands (init, add)

pub mod plumbing;
pub mod porcelain;
