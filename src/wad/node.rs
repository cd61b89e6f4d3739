//! Arena-allocated directory tree.
//!
//! Nodes live in one `Vec` and refer to each other by index, with parent
//! links as plain ids. Directory nodes record which marker lumps back them,
//! so serialization never has to rediscover markers by name.

use indexmap::IndexMap;

use super::lump::LumpId;

/// Handle into the node arena.
pub type NodeId = usize;

/// The root is always the first node allocated.
pub const ROOT: NodeId = 0;

/// Marker lumps backing a directory node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirMarkers {
    /// The root has no on-disk representation.
    Root,
    /// `<name>_START` / `<name>_END` bracket. `end` is `None` only when the
    /// source table never closed the bracket.
    Bracketed { start: LumpId, end: Option<LumpId> },
    /// Single map marker lump; map directories have no closing marker.
    Map { marker: LumpId },
}

/// Node payload: directory with ordered children, or file with its lump.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Directory {
        /// Insertion-ordered, unique by name.
        children: IndexMap<String, NodeId>,
        markers: DirMarkers,
    },
    File {
        lump: LumpId,
    },
}

/// One tree node. The root has an empty name and no parent.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Map directories are fixed-arity containers; mutation inside them is
    /// rejected.
    pub fn is_map_directory(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Directory {
                markers: DirMarkers::Map { .. },
                ..
            }
        )
    }

    /// Marker lumps backing this node, if it is a directory.
    pub fn markers(&self) -> Option<&DirMarkers> {
        match &self.kind {
            NodeKind::Directory { markers, .. } => Some(markers),
            NodeKind::File { .. } => None,
        }
    }
}

/// The directory tree. Always rooted; nodes are never removed.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// New tree holding only the root directory.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                kind: NodeKind::Directory {
                    children: IndexMap::new(),
                    markers: DirMarkers::Root,
                },
            }],
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Look up a child by exact name. `None` when `dir` is not a directory
    /// or has no such child.
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes[dir].kind {
            NodeKind::Directory { children, .. } => children.get(name).copied(),
            NodeKind::File { .. } => None,
        }
    }

    /// Child names of a directory in stored insertion order.
    pub fn child_names(&self, dir: NodeId) -> Option<Vec<String>> {
        match &self.nodes[dir].kind {
            NodeKind::Directory { children, .. } => {
                Some(children.keys().cloned().collect())
            }
            NodeKind::File { .. } => None,
        }
    }

    /// Add a directory under `parent`. A same-named sibling is replaced in
    /// place, keeping one entry per name.
    pub fn add_directory(
        &mut self,
        parent: NodeId,
        name: String,
        markers: DirMarkers,
    ) -> NodeId {
        let id = self.push(Node {
            name: name.clone(),
            parent: Some(parent),
            kind: NodeKind::Directory {
                children: IndexMap::new(),
                markers,
            },
        });
        self.link(parent, name, id);
        id
    }

    /// Add a file under `parent`, referencing `lump`.
    pub fn add_file(&mut self, parent: NodeId, name: String, lump: LumpId) -> NodeId {
        let id = self.push(Node {
            name: name.clone(),
            parent: Some(parent),
            kind: NodeKind::File { lump },
        });
        self.link(parent, name, id);
        id
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    fn link(&mut self, parent: NodeId, name: String, id: NodeId) {
        if let NodeKind::Directory { children, .. } = &mut self.nodes[parent].kind {
            children.insert(name, id);
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
