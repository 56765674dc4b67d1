//! Object database helpers
//!
//! Pure transformations applied to object payloads on their way to and from
//! disk.

pub mod compression;
