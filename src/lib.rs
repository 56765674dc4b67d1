//! A minimal git-compatible object store
//!
//! Blobs and trees are hashed, compressed and stored the way git stores
//! them, and the staging index is written in the version 2 format, so
//! `git` can read what this crate produces.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
pub mod logging;
