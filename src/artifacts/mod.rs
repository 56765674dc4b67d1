//! Pure data structures and codecs
//!
//! - `database`: zlib compression of stored objects
//! - `index`: Binary format of the staging index
//! - `objects`: Object identifiers, blobs and trees
//! - `tree_builder`: Turning a working tree into tree objects

pub mod database;
pub mod index;
pub mod objects;
pub mod tree_builder;
