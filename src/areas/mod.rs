//! Stateful areas of a repository
//!
//! - `database`: Content-addressed object store under `<meta>/objects`
//! - `index`: Staging area persisted as `<meta>/index`
//! - `layout`: Paths derived from the working-tree root and metadata directory name
//! - `repository`: Ties the areas together for the commands
//! - `workspace`: Working directory walk and file access

pub mod database;
pub mod index;
pub mod layout;
pub mod repository;
pub mod workspace;
