//! Tree construction from the flat lump table.
//!
//! One left-to-right pass with an explicit directory stack. This is the
//! algorithm that defines tree shape, so its quirks are contract, not
//! accident:
//!
//! - `_START`/`_END` are matched by suffix; an `_END` closes whichever
//!   directory is currently open, whatever its own name says
//! - an `_END` with no open directory is ignored, and its lump ends up
//!   orphaned (it drops out of the table on the next write-back)
//! - a map marker consumes the following up-to-10 lumps as file children
//!   unconditionally, regardless of those lumps' own names

use log::debug;

use super::lump::{Lump, LumpRole, MAP_LUMP_COUNT};
use super::node::{DirMarkers, NodeId, NodeKind, Tree, ROOT};

/// Build the directory tree implied by `lumps`. Slab indices double as
/// [`super::lump::LumpId`]s.
pub fn build_tree(lumps: &[Lump]) -> Tree {
    let mut tree = Tree::new();
    let mut current: NodeId = ROOT;
    let mut stack: Vec<NodeId> = Vec::new();

    let mut i = 0;
    while i < lumps.len() {
        match LumpRole::of(&lumps[i].name) {
            LumpRole::DirectoryStart(name) => {
                let dir = tree.add_directory(
                    current,
                    name,
                    DirMarkers::Bracketed {
                        start: i,
                        end: None,
                    },
                );
                stack.push(current);
                current = dir;
                i += 1;
            }
            LumpRole::DirectoryEnd => {
                match stack.pop() {
                    Some(previous) => {
                        if let NodeKind::Directory {
                            markers: DirMarkers::Bracketed { end, .. },
                            ..
                        } = &mut tree.node_mut(current).kind
                        {
                            *end = Some(i);
                        }
                        current = previous;
                    }
                    // Malformed input is tolerated, not rejected.
                    None => debug!("ignoring stray end marker {:?}", lumps[i].name),
                }
                i += 1;
            }
            LumpRole::MapMarker => {
                let map = tree.add_directory(
                    current,
                    lumps[i].name.clone(),
                    DirMarkers::Map { marker: i },
                );
                let take = MAP_LUMP_COUNT.min(lumps.len() - i - 1);
                for j in 1..=take {
                    tree.add_file(map, lumps[i + j].name.clone(), i + j);
                }
                i += 1 + take;
            }
            LumpRole::Data => {
                tree.add_file(current, lumps[i].name.clone(), i);
                i += 1;
            }
        }
    }

    tree
}
