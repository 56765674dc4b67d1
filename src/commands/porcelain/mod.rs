//! Porcelain commands
//!
//! ## Commands
//!
//! - `init`: Create the metadata directory of a new repository
//! - `add`: Stage files in the index

pub mod add;
pub mod init;
