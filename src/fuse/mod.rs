//! FUSE adapter: kernel filesystem calls mapped onto the WAD library.
//!
//! The adapter owns the open container behind one `RwLock`. Mutating
//! operations (`mknod`, `mkdir`, `write`) take the write lock; attribute
//! lookups, listings, and content reads take the read lock and may run
//! concurrently, since every read opens its own handle to the backing
//! file. Inode numbers are handed out per path on first sight and are
//! never reused; the container has no rename or unlink, so a path keeps
//! its inode for the life of the mount.
//!
//! Status mapping follows the library's error taxonomy: unresolved paths
//! and failed reads surface as `ENOENT`, a write against an
//! already-materialized file as `EPERM`, creation rejections as the
//! closest matching errno. The synthetic `.`/`..` listing entries are
//! added here, never by the library.

use std::ffi::OsStr;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

use fuser::{FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory, ReplyEntry, ReplyWrite, Request};
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::store::FileStore;
use crate::wad::{Wad, WadError};

/// Root inode number (FUSE convention: inode 1 is root).
pub const ROOT_INO: u64 = 1;

/// TTL for cached attributes and entries.
const TTL: Duration = Duration::from_secs(1);

/// Node classification as seen through the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeClass {
    Directory,
    File { size: u32 },
}

/// The WAD container mounted as a FUSE filesystem.
pub struct WadFs {
    wad: RwLock<Wad<FileStore>>,
    inode_paths: FxHashMap<u64, String>,
    path_inodes: FxHashMap<String, u64>,
    next_ino: u64,
    uid: u32,
    gid: u32,
}

impl WadFs {
    /// Wrap an open container for mounting.
    pub fn new(wad: Wad<FileStore>) -> Self {
        let mut fs = WadFs {
            wad: RwLock::new(wad),
            inode_paths: FxHashMap::default(),
            path_inodes: FxHashMap::default(),
            next_ino: ROOT_INO + 1,
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
        };
        fs.inode_paths.insert(ROOT_INO, "/".to_string());
        fs.path_inodes.insert("/".to_string(), ROOT_INO);
        fs
    }

    /// Inode for a path, allocating one on first sight.
    fn ino_for(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.path_inodes.get(path) {
            return ino;
        }
        let ino = self.next_ino;
        self.next_ino += 1;
        self.path_inodes.insert(path.to_string(), ino);
        self.inode_paths.insert(ino, path.to_string());
        ino
    }

    fn path_of(&self, ino: u64) -> Option<String> {
        self.inode_paths.get(&ino).cloned()
    }

    fn child_path(parent: &str, name: &str) -> String {
        if parent == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent, name)
        }
    }

    /// Classify a path under the read lock.
    fn classify(&self, path: &str) -> Option<NodeClass> {
        let wad = self.wad.read().ok()?;
        if wad.is_directory(path) {
            Some(NodeClass::Directory)
        } else if wad.is_content(path) {
            Some(NodeClass::File {
                size: wad.size(path).unwrap_or(0),
            })
        } else {
            None
        }
    }

    /// Build FUSE attributes: directories 0755 with nlink 2, files 0644
    /// with nlink 1, the fixed policy of this filesystem.
    fn attr(&self, ino: u64, class: NodeClass) -> FileAttr {
        let now = SystemTime::now();
        let (kind, perm, nlink, size) = match class {
            NodeClass::Directory => (FileType::Directory, 0o755, 2, 0),
            NodeClass::File { size } => (FileType::RegularFile, 0o644, 1, size as u64),
        };
        FileAttr {
            ino,
            size,
            blocks: size.div_ceil(512),
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind,
            perm,
            nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: 4096,
            flags: 0,
        }
    }
}

/// Errno for a creation failure.
fn create_errno(err: &WadError) -> libc::c_int {
    match err {
        WadError::NotFound { .. } => libc::ENOENT,
        WadError::NotADirectory { .. } => libc::ENOTDIR,
        WadError::AlreadyExists { .. } => libc::EEXIST,
        WadError::Io(_) => libc::EIO,
        // Name-shape and map-directory rejections.
        _ => libc::EPERM,
    }
}

impl Filesystem for WadFs {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), libc::c_int> {
        if let Ok(wad) = self.wad.read() {
            info!(
                "mounted container: magic {}, {} lumps",
                wad.magic(),
                wad.lump_count()
            );
        }
        Ok(())
    }

    fn destroy(&mut self) {
        info!("container unmounted");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(parent_path) = self.path_of(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };

        let path = Self::child_path(&parent_path, name);
        match self.classify(&path) {
            Some(class) => {
                let ino = self.ino_for(&path);
                reply.entry(&TTL, &self.attr(ino, class), 0);
            }
            None => reply.error(libc::ENOENT),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        match self.classify(&path) {
            Some(class) => reply.attr(&TTL, &self.attr(ino, class)),
            None => reply.error(libc::ENOENT),
        }
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        if mode & libc::S_IFMT as u32 != libc::S_IFREG as u32 {
            reply.error(libc::EINVAL);
            return;
        }
        let (Some(parent_path), Some(name)) = (self.path_of(parent), name.to_str()) else {
            reply.error(libc::ENOENT);
            return;
        };

        let path = Self::child_path(&parent_path, name);
        let result = match self.wad.write() {
            Ok(mut wad) => wad.create_file(&path),
            Err(_) => {
                reply.error(libc::EIO);
                return;
            }
        };

        match result {
            Ok(()) => {
                let ino = self.ino_for(&path);
                let attr = self.attr(ino, NodeClass::File { size: 0 });
                reply.entry(&TTL, &attr, 0);
            }
            Err(e) => {
                warn!("create file {} rejected: {}", path, e);
                reply.error(create_errno(&e));
            }
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let (Some(parent_path), Some(name)) = (self.path_of(parent), name.to_str()) else {
            reply.error(libc::ENOENT);
            return;
        };

        let path = Self::child_path(&parent_path, name);
        let result = match self.wad.write() {
            Ok(mut wad) => wad.create_directory(&path),
            Err(_) => {
                reply.error(libc::EIO);
                return;
            }
        };

        match result {
            Ok(()) => {
                let ino = self.ino_for(&path);
                let attr = self.attr(ino, NodeClass::Directory);
                reply.entry(&TTL, &attr, 0);
            }
            Err(e) => {
                warn!("create directory {} rejected: {}", path, e);
                reply.error(create_errno(&e));
            }
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        let mut buf = vec![0u8; size as usize];
        let result = match self.wad.read() {
            Ok(wad) => wad.read(&path, &mut buf, offset as u64),
            Err(_) => {
                reply.error(libc::EIO);
                return;
            }
        };

        match result {
            Ok(n) => reply.data(&buf[..n]),
            // Read failures map to the not-found status.
            Err(_) => reply.error(libc::ENOENT),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        let result = match self.wad.write() {
            Ok(mut wad) => wad.write(&path, data, offset as u64),
            Err(_) => {
                reply.error(libc::EIO);
                return;
            }
        };

        match result {
            Ok(n) => reply.written(n as u32),
            Err(WadError::AlreadyMaterialized { .. }) => reply.error(libc::EPERM),
            Err(_) => reply.error(libc::ENOENT),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        let names = match self.wad.read() {
            Ok(wad) => wad.list_dir(&path),
            Err(_) => {
                reply.error(libc::EIO);
                return;
            }
        };
        let names = match names {
            Ok(names) => names,
            Err(_) => {
                reply.error(libc::ENOENT);
                return;
            }
        };

        // Synthetic entries first; the library never reports them.
        let parent_ino = crate::wad::path::split_parent(&path)
            .and_then(|(parent, _)| self.path_inodes.get(parent).copied())
            .unwrap_or(ino);
        let mut entries: Vec<(u64, FileType, String)> = vec![
            (ino, FileType::Directory, ".".to_string()),
            (parent_ino, FileType::Directory, "..".to_string()),
        ];

        for name in names {
            let child = Self::child_path(&path, &name);
            let kind = match self.classify(&child) {
                Some(NodeClass::Directory) => FileType::Directory,
                _ => FileType::RegularFile,
            };
            let child_ino = self.ino_for(&child);
            entries.push((child_ino, kind, name));
        }

        for (i, (ino, kind, name)) in entries.into_iter().enumerate().skip(offset as usize) {
            // Reply returns true once the buffer is full.
            if reply.add(ino, (i + 1) as i64, kind, &name) {
                break;
            }
        }
        reply.ok();
    }
}
