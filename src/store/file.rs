//! File-backed store.
//!
//! Opens a fresh handle for every read and write rather than holding one
//! open descriptor. Readers therefore never contend on shared seek state,
//! which is what lets the FUSE adapter service reads concurrently while
//! mutations hold the exclusive lock.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::Store;

/// Store backed by the container file on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store over an existing container file.
    ///
    /// Fails if the file cannot be opened for reading; this is the load
    /// error surface for [`crate::Wad::load`].
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        // Probe once so an unreachable container fails the open, not the
        // first read.
        File::open(&path)?;
        Ok(Self { path })
    }

    /// Path of the backing container file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for FileStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        file.flush()
    }
}
