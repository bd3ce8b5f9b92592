//! Node store: owns every AST node by id.
//!
//! Nodes live in a contiguous arena; the open-addressing [`NodeMap`] maps a
//! parser-assigned [`NodeId`] to its arena slot. Parent/child links are
//! owning (a node's children are appended in arrival order on insert);
//! `scope`, `reference`, and deferred-store entries are plain ids resolved
//! back through the store.

use std::fmt;
use std::ops::{Index, IndexMut};

use thiserror::Error;

use crate::map::{MapError, NodeMap};
use crate::{AstNode, NodeId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("node id {0} is used by more than one node")]
    DuplicateId(NodeId),
    #[error("node {node} names parent {parent}, which has not been inserted")]
    MissingParent { node: NodeId, parent: NodeId },
    #[error("node {node} has no parent but {root} is already the root")]
    MultipleRoots { node: NodeId, root: NodeId },
    #[error("node id 0 is reserved")]
    ReservedId,
    #[error("unknown node kind `{0}`")]
    UnknownWhich(String),
    #[error("unknown role `{0}`")]
    UnknownRole(String),
}

#[derive(Copy, Clone)]
struct Slot {
    id: NodeId,
    index: u32,
}

fn slot_key(slot: &Slot) -> u32 {
    slot.id.raw()
}

#[derive(Clone)]
pub struct NodeStore {
    nodes: Vec<AstNode>,
    index: NodeMap<Slot>,
    root: Option<NodeId>,
}

impl NodeStore {
    /// Size hint used when none is configured.
    pub const DEFAULT_SIZE_HINT: usize = 500;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_SIZE_HINT)
    }

    /// Create a store sized for roughly `size_hint` nodes.
    pub fn with_capacity(size_hint: usize) -> Self {
        NodeStore {
            nodes: Vec::with_capacity(size_hint),
            index: NodeMap::create(slot_key, size_hint),
            root: None,
        }
    }

    /// Insert a node.
    ///
    /// The parent, if any, must already be present; the node is appended to
    /// its children. The single node without a parent becomes the root.
    pub fn insert(&mut self, mut node: AstNode) -> Result<NodeId, StoreError> {
        let id = node.id;
        if !id.is_valid() {
            return Err(StoreError::ReservedId);
        }
        if self.index.contains(id.raw()) {
            return Err(StoreError::DuplicateId(id));
        }
        let parent_slot = match node.parent {
            Some(parent) => match self.slot(parent) {
                Some(slot) => Some(slot),
                None => return Err(StoreError::MissingParent { node: id, parent }),
            },
            None => {
                if let Some(root) = self.root {
                    return Err(StoreError::MultipleRoots { node: id, root });
                }
                None
            }
        };

        let Ok(index) = u32::try_from(self.nodes.len()) else {
            return Err(StoreError::ReservedId);
        };
        self.index.add(Slot { id, index }).map_err(|e| match e {
            MapError::Duplicate { .. } => StoreError::DuplicateId(id),
            MapError::ReservedKey => StoreError::ReservedId,
        })?;
        node.children.clear();
        tracing::trace!(%id, which = %node.which, parent = ?node.parent, "insert node");
        self.nodes.push(node);

        match parent_slot {
            Some(slot) => self.nodes[slot].children.push(id),
            None => self.root = Some(id),
        }
        Ok(id)
    }

    #[inline]
    fn slot(&self, id: NodeId) -> Option<usize> {
        self.index.retrieve(id.raw()).map(|s| s.index as usize)
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.slot(id).map(|slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains(id.raw())
    }

    /// The root node, once inserted.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` in arrival order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(AstNode::children).unwrap_or_default()
    }

    /// Children of `id` with the given role.
    pub fn children_with_role(
        &self,
        id: NodeId,
        role: crate::Role,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self[child].role == role)
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).and_then(|n| n.parent), |&p| {
            self.get(p).and_then(|n| n.parent)
        })
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AstNode> {
        self.nodes.iter()
    }

    /// Depth-first preorder from the root, with depth.
    pub fn preorder(&self) -> Vec<(NodeId, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            order.push((id, depth));
            for &child in self.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        order
    }

    /// Consume the store, handing each node to `destructor` once.
    /// Returns the number of nodes destroyed.
    pub fn destroy(self, mut destructor: impl FnMut(AstNode)) -> usize {
        let NodeStore { nodes, index, .. } = self;
        let released = index.destroy(|_| {});
        debug_assert_eq!(released, nodes.len());
        let mut count = 0;
        for node in nodes {
            destructor(node);
            count += 1;
        }
        count
    }
}

/// Summary only; a node dump is [`render_tree`](crate::render::render_tree).
impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.nodes.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for NodeStore {
    type Output = AstNode;

    /// # Panics
    /// Panics if `id` was never inserted.
    fn index(&self, id: NodeId) -> &AstNode {
        match self.slot(id) {
            Some(slot) => &self.nodes[slot],
            None => panic!("node {id} is not in the store"),
        }
    }
}

impl IndexMut<NodeId> for NodeStore {
    fn index_mut(&mut self, id: NodeId) -> &mut AstNode {
        match self.slot(id) {
            Some(slot) => &mut self.nodes[slot],
            None => panic!("node {id} is not in the store"),
        }
    }
}

// Tests
