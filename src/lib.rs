//! # wadfs
//!
//! DOOM-style WAD container files exposed as a mutable hierarchical
//! filesystem.
//!
//! A WAD file is a flat sequence of named byte ranges ("lumps") described by
//! a descriptor table inside the file. Directory structure is not stored
//! explicitly: it is encoded in lump naming conventions
//! (`X_START`/`X_END` bracket pairs and `E?M?` map markers). This crate
//! parses the table, reconstructs the implied directory tree, resolves
//! slash-delimited paths against it, supports in-place mutation (creating
//! directories and files, single-shot data writes), and writes the
//! regenerated descriptor table back to the container.
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Store layer** - random-access byte I/O behind a trait, so the core
//!    runs against real files or in-memory buffers
//! 2. **Lump layer** - descriptor records and naming-convention
//!    classification
//! 3. **Tree layer** - arena-allocated directory tree built from the table
//! 4. **Archive layer** - path queries, mutation, write-back serialization
//!
//! # Usage
//!
//! ```ignore
//! use wadfs::Wad;
//!
//! let mut wad = Wad::load("doom.wad")?;
//! assert!(wad.is_directory("/"));
//!
//! let names = wad.list_dir("/")?;
//! wad.create_file("/NOTES")?;
//! wad.write("/NOTES", b"hello", 0)?;
//! ```
//!
//! # FUSE mounting
//!
//! With the `fuse` feature, [`fuse::WadFs`] maps kernel filesystem calls
//! onto the library, and the `wadfs` binary mounts a container at a mount
//! point.

pub mod store;
pub mod wad;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use store::{FileStore, MemStore, Store};
pub use wad::{Lump, Wad, WadError, WadResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_container_loads() {
        // Header only: magic, zero lumps, table immediately after the header.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"IWAD");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&12u32.to_le_bytes());

        let wad = Wad::open(MemStore::from_bytes(bytes)).unwrap();
        assert_eq!(wad.magic(), "IWAD");
        assert!(wad.list_dir("/").unwrap().is_empty());
    }
}
