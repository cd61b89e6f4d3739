//! Error types for WAD operations.

use std::fmt;
use std::io;

/// Result type for WAD operations.
pub type WadResult<T> = Result<T, WadError>;

/// Errors that can occur while loading, querying, or mutating a container.
///
/// Mutation rejections (`AlreadyExists`, `NameTooLong`, `ReservedName`,
/// `ImmutableParent`, `AlreadyMaterialized`, `InvalidPath`) guarantee that
/// neither the in-memory state nor the backing bytes changed.
#[derive(Debug)]
pub enum WadError {
    /// I/O error against the backing store.
    Io(io::Error),

    /// Container ended before the header or descriptor table did.
    Truncated,

    /// Path does not resolve to any node.
    NotFound { path: String },

    /// Path resolves to a directory where a file was required.
    NotAFile { path: String },

    /// Path resolves to a file where a directory was required.
    NotADirectory { path: String },

    /// A sibling with that name already exists.
    AlreadyExists { path: String },

    /// Name does not fit its on-disk lump encoding.
    NameTooLong { name: String, max: usize },

    /// Name shape is reserved for map markers.
    ReservedName { name: String },

    /// Parent is a map directory, which has fixed contents.
    ImmutableParent { path: String },

    /// The file already holds data; lumps are written exactly once.
    AlreadyMaterialized { path: String },

    /// Path is empty, relative, or otherwise malformed.
    InvalidPath { path: String },
}

impl fmt::Display for WadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WadError::Io(e) => write!(f, "I/O error: {}", e),
            WadError::Truncated => write!(f, "container truncated"),
            WadError::NotFound { path } => write!(f, "no such node: {}", path),
            WadError::NotAFile { path } => write!(f, "not a file: {}", path),
            WadError::NotADirectory { path } => write!(f, "not a directory: {}", path),
            WadError::AlreadyExists { path } => write!(f, "already exists: {}", path),
            WadError::NameTooLong { name, max } => {
                write!(f, "name {:?} exceeds {} bytes", name, max)
            }
            WadError::ReservedName { name } => {
                write!(f, "name {:?} is reserved for map markers", name)
            }
            WadError::ImmutableParent { path } => {
                write!(f, "map directory {} cannot be modified", path)
            }
            WadError::AlreadyMaterialized { path } => {
                write!(f, "{} already holds data", path)
            }
            WadError::InvalidPath { path } => write!(f, "invalid path: {:?}", path),
        }
    }
}

impl std::error::Error for WadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WadError {
    fn from(err: io::Error) -> Self {
        WadError::Io(err)
    }
}
