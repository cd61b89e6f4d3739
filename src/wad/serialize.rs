//! Write-back serialization.
//!
//! The descriptor table is regenerated from the tree by canonical pre-order
//! traversal and rewritten in full on every mutating call, together with
//! the count and table-offset header fields. File payload bytes are never
//! moved; only descriptor metadata is rewritten.

use std::io;

use crate::store::Store;

use super::lump::{Lump, LumpId, COUNT_OFFSET, DESCRIPTOR_LEN};
use super::node::{DirMarkers, NodeId, NodeKind, Tree, ROOT};

/// Linearize the tree into descriptor-table order.
///
/// Root children are emitted bare; ordinary directories bracket their
/// children with their start/end marker lumps; map directories emit the
/// marker followed by their file children, with no closing marker. Marker
/// lumps are reached through the ids stored on each node, never by name.
pub fn linearize(tree: &Tree) -> Vec<LumpId> {
    let mut order = Vec::new();
    push_node(tree, ROOT, &mut order);
    order
}

fn push_node(tree: &Tree, id: NodeId, order: &mut Vec<LumpId>) {
    match &tree.node(id).kind {
        NodeKind::File { lump } => order.push(*lump),
        NodeKind::Directory { children, markers } => {
            match markers {
                DirMarkers::Root => {}
                DirMarkers::Bracketed { start, .. } => order.push(*start),
                DirMarkers::Map { marker } => order.push(*marker),
            }
            for child in children.values() {
                push_node(tree, *child, order);
            }
            if let DirMarkers::Bracketed { end: Some(end), .. } = markers {
                order.push(*end);
            }
        }
    }
}

/// Rewrite the header count/offset fields and the descriptor table.
pub fn write_back<S: Store>(
    store: &mut S,
    table_offset: u32,
    lumps: &[Lump],
    order: &[LumpId],
) -> io::Result<()> {
    let mut header = [0u8; 8];
    header[..4].copy_from_slice(&(order.len() as u32).to_le_bytes());
    header[4..].copy_from_slice(&table_offset.to_le_bytes());
    store.write_at(&header, COUNT_OFFSET)?;

    let mut table = Vec::with_capacity(order.len() * DESCRIPTOR_LEN);
    for &id in order {
        let lump = &lumps[id];
        table.extend_from_slice(&lump.offset.to_le_bytes());
        table.extend_from_slice(&lump.size.to_le_bytes());
        table.extend_from_slice(&lump.encode_name());
    }
    store.write_at(&table, table_offset as u64)
}
