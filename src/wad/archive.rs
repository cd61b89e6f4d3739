//! The container handle: load, queries, mutation, write-back.
//!
//! A [`Wad`] owns three things that must stay consistent: the backing
//! store, the lump slab with its table order, and the directory tree.
//! Every mutating call validates first, then updates table and tree
//! together, then rewrites the header and descriptor table before
//! returning. Rejected mutations change nothing.

use std::path::Path;

use log::debug;

use crate::store::{FileStore, Store};

use super::build::build_tree;
use super::error::{WadError, WadResult};
use super::lump::{self, Lump, LumpId, DIR_NAME_MAX, NAME_LEN};
use super::node::{DirMarkers, NodeId, NodeKind, Tree, ROOT};
use super::path;
use super::{parse, serialize};

/// An open WAD container.
///
/// The lump slab is append-only; `order` holds the slab ids in descriptor
/// table order and is what write-back serializes. Tree nodes refer to
/// lumps by slab id, so reordering the table never invalidates them.
pub struct Wad<S: Store> {
    store: S,
    magic: [u8; 4],
    /// Descriptor-table offset. Doubles as the append cursor: data written
    /// without an explicit offset lands here and pushes the table back.
    table_offset: u32,
    lumps: Vec<Lump>,
    order: Vec<LumpId>,
    tree: Tree,
}

impl Wad<FileStore> {
    /// Open a WAD container file on disk.
    pub fn load(path: impl AsRef<Path>) -> WadResult<Self> {
        Self::open(FileStore::open(path)?)
    }
}

impl<S: Store> Wad<S> {
    /// Open a container over any store.
    pub fn open(store: S) -> WadResult<Self> {
        let header = parse::read_header(&store)?;
        let lumps = parse::read_table(&store, &header)?;
        let order: Vec<LumpId> = (0..lumps.len()).collect();
        let tree = build_tree(&lumps);

        debug!(
            "loaded container: {} lumps, table at {}",
            lumps.len(),
            header.table_offset
        );

        Ok(Self {
            store,
            magic: header.magic,
            table_offset: header.table_offset,
            lumps,
            order,
            tree,
        })
    }

    /// The container's magic tag, cut at the first NUL as stored.
    pub fn magic(&self) -> String {
        let end = self.magic.iter().position(|&b| b == 0).unwrap_or(4);
        String::from_utf8_lossy(&self.magic[..end]).into_owned()
    }

    /// Number of descriptor records currently in the table.
    pub fn lump_count(&self) -> usize {
        self.order.len()
    }

    /// Whether `path` resolves to a directory.
    pub fn is_directory(&self, path: &str) -> bool {
        self.resolve(path)
            .map(|id| self.tree.node(id).is_directory())
            .unwrap_or(false)
    }

    /// Whether `path` resolves to a file.
    pub fn is_content(&self, path: &str) -> bool {
        self.resolve(path)
            .map(|id| !self.tree.node(id).is_directory())
            .unwrap_or(false)
    }

    /// Size in bytes of the file at `path`.
    pub fn size(&self, path: &str) -> WadResult<u32> {
        let lump = self.resolve_file(path)?;
        Ok(self.lumps[lump].size)
    }

    /// Read file contents into `buf` starting at `offset` within the file.
    ///
    /// Returns the number of bytes copied: `min(buf.len(), size - offset)`,
    /// or 0 when `offset` is at or past the end. The backing store is
    /// re-accessed on every call; nothing is cached.
    pub fn read(&self, path: &str, buf: &mut [u8], offset: u64) -> WadResult<usize> {
        let lump = &self.lumps[self.resolve_file(path)?];
        let size = lump.size as u64;
        if offset >= size {
            return Ok(0);
        }

        let want = buf.len().min((size - offset) as usize);
        let got = self.store.read_at(&mut buf[..want], lump.offset as u64 + offset)?;
        if got < want {
            // Lump range runs past the end of the store.
            return Err(WadError::Truncated);
        }
        Ok(want)
    }

    /// Child names of the directory at `path`, in stored insertion order.
    /// No synthetic `.`/`..` entries.
    pub fn list_dir(&self, path: &str) -> WadResult<Vec<String>> {
        let id = self.resolve(path).ok_or_else(|| WadError::NotFound {
            path: path.to_string(),
        })?;
        self.tree
            .child_names(id)
            .ok_or_else(|| WadError::NotADirectory {
                path: path.to_string(),
            })
    }

    /// Create a directory at `path`.
    ///
    /// Inserts a zero-size `<name>_START`/`<name>_END` pair: appended to
    /// the table when the parent is the root, otherwise immediately before
    /// the parent's own end marker so the new subtree nests inside its
    /// parent's bracket. Rewrites the container before returning.
    pub fn create_directory(&mut self, path: &str) -> WadResult<()> {
        let normalized = path::normalize(path);
        let (parent, name) = self.resolve_parent(&normalized)?;

        if name.len() > DIR_NAME_MAX {
            return Err(WadError::NameTooLong {
                name,
                max: DIR_NAME_MAX,
            });
        }
        if self.tree.child(parent, &name).is_some() {
            return Err(WadError::AlreadyExists { path: normalized });
        }

        let start = self.push_lump(Lump::placeholder(format!("{}_START", name)));
        let end = self.push_lump(Lump::placeholder(format!("{}_END", name)));

        let at = self.insertion_index(parent);
        self.order.insert(at, start);
        self.order.insert(at + 1, end);
        self.tree.add_directory(
            parent,
            name,
            DirMarkers::Bracketed {
                start,
                end: Some(end),
            },
        );

        debug!("created directory {}", normalized);
        self.flush()
    }

    /// Create an empty file at `path`.
    ///
    /// The new zero-size lump is placed by the same rule as directory
    /// markers. The file holds no data until the first [`Wad::write`].
    pub fn create_file(&mut self, path: &str) -> WadResult<()> {
        if path.ends_with('/') {
            return Err(WadError::InvalidPath {
                path: path.to_string(),
            });
        }
        let normalized = path::normalize(path);
        let (parent, name) = self.resolve_parent(&normalized)?;

        if lump::is_reserved_map_name(&name) {
            return Err(WadError::ReservedName { name });
        }
        if self.tree.child(parent, &name).is_some() {
            return Err(WadError::AlreadyExists { path: normalized });
        }
        if name.len() > NAME_LEN {
            return Err(WadError::NameTooLong {
                name,
                max: NAME_LEN,
            });
        }

        let id = self.push_lump(Lump::placeholder(name.clone()));
        let at = self.insertion_index(parent);
        self.order.insert(at, id);
        self.tree.add_file(parent, name, id);

        debug!("created file {}", normalized);
        self.flush()
    }

    /// Write `buf` to the file at `path`, exactly once.
    ///
    /// A lump is materialized with data a single time; writing to a file
    /// that already holds data is rejected without touching its bytes.
    /// `offset == 0` selects the append cursor (the current descriptor
    /// table offset) as the write target; any other offset is used
    /// directly. The cursor advances by the write length either way, and
    /// the descriptor table is rewritten at its new offset.
    pub fn write(&mut self, path: &str, buf: &[u8], offset: u64) -> WadResult<usize> {
        let lump_id = self.resolve_file(path)?;
        if self.lumps[lump_id].is_materialized() {
            return Err(WadError::AlreadyMaterialized {
                path: path.to_string(),
            });
        }

        let target = if offset == 0 {
            self.table_offset
        } else {
            offset as u32
        };

        self.lumps[lump_id].offset = target;
        self.lumps[lump_id].size = buf.len() as u32;
        self.table_offset += buf.len() as u32;

        self.store.write_at(buf, target as u64)?;
        self.flush()?;

        debug!("wrote {} bytes to {} at {}", buf.len(), path, target);
        Ok(buf.len())
    }

    /// Resolve a path to a node. Empty and relative paths do not resolve.
    fn resolve(&self, raw: &str) -> Option<NodeId> {
        if raw.is_empty() || !raw.starts_with('/') {
            return None;
        }
        let normalized = path::normalize(raw);
        let mut current = ROOT;
        for segment in path::segments(&normalized) {
            current = self.tree.child(current, segment)?;
        }
        Some(current)
    }

    /// Resolve a path that must be a file; returns its lump id.
    fn resolve_file(&self, raw: &str) -> WadResult<LumpId> {
        let id = self.resolve(raw).ok_or_else(|| WadError::NotFound {
            path: raw.to_string(),
        })?;
        match self.tree.node(id).kind {
            NodeKind::File { lump } => Ok(lump),
            NodeKind::Directory { .. } => Err(WadError::NotAFile {
                path: raw.to_string(),
            }),
        }
    }

    /// Resolve the parent directory for a creation path and validate it as
    /// a mutation target. Returns the parent node and the new entry name.
    fn resolve_parent(&self, normalized: &str) -> WadResult<(NodeId, String)> {
        let (parent_path, name) =
            path::split_parent(normalized).ok_or_else(|| WadError::InvalidPath {
                path: normalized.to_string(),
            })?;
        let parent = self.resolve(parent_path).ok_or_else(|| WadError::NotFound {
            path: parent_path.to_string(),
        })?;
        let node = self.tree.node(parent);
        if !node.is_directory() {
            return Err(WadError::NotADirectory {
                path: parent_path.to_string(),
            });
        }
        if node.is_map_directory() {
            return Err(WadError::ImmutableParent {
                path: parent_path.to_string(),
            });
        }
        Ok((parent, name.to_string()))
    }

    fn push_lump(&mut self, lump: Lump) -> LumpId {
        let id = self.lumps.len();
        self.lumps.push(lump);
        id
    }

    /// Table position where a new child of `parent` is inserted: the end of
    /// the table for the root, otherwise just before the parent's end
    /// marker. An unterminated parent bracket degrades to appending.
    fn insertion_index(&self, parent: NodeId) -> usize {
        match self.tree.node(parent).markers() {
            Some(DirMarkers::Bracketed { end: Some(end), .. }) => self
                .order
                .iter()
                .position(|id| id == end)
                .unwrap_or(self.order.len()),
            _ => self.order.len(),
        }
    }

    /// Regenerate the table order from the tree and rewrite the header and
    /// descriptor table.
    fn flush(&mut self) -> WadResult<()> {
        self.order = serialize::linearize(&self.tree);
        serialize::write_back(&mut self.store, self.table_offset, &self.lumps, &self.order)?;
        Ok(())
    }
}
