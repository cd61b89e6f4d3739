//! WAD container core.
//!
//! The container format is a 12-byte header (4-byte magic, u32 lump count,
//! u32 descriptor-table offset, all little-endian) plus a flat descriptor
//! table of 16-byte records: u32 data offset, u32 data size, 8-byte
//! NUL-padded name. Table order is the sole encoding of directory
//! structure:
//!
//! - `X_START` ... `X_END` bracket the lumps of directory `X`
//! - a 4-byte name with `E` at position 0 and `M` at position 2 marks a map
//!   directory whose children are the next up-to-10 lumps, unconditionally
//! - every other lump is a file in whichever directory is open at that
//!   point in the scan
//!
//! [`Wad`] keeps the flat table and the reconstructed tree consistent
//! across every mutation and rewrites the header and table before each
//! mutating call returns.

pub mod archive;
pub mod build;
pub mod error;
pub mod lump;
pub mod node;
pub mod parse;
pub mod path;
pub mod serialize;

pub use archive::Wad;
pub use error::{WadError, WadResult};
pub use lump::{Lump, LumpId};
