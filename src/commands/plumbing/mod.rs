//! Plumbing commands
//!
//! Low-level access to the object store and the index, usable from scripts
//! and as building blocks for the porcelain.
//!
//! ## Commands
//!
//! - `hash-object`: Compute a blob digest and optionally store the blob
//! - `ls-files`: List the entries of the index
//! - `write-tree`: Store the tree of the working directory or the index

pub mod hash_object;
pub mod ls_files;
pub mod write_tree;
