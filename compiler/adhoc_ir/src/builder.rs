//! Programmatic tree construction.
//!
//! Assigns ids sequentially from 1 and inserts each node as it is built, so
//! parents always precede children. The first insertion error is kept and
//! returned from [`TreeBuilder::finish`].

use crate::{ActionWhich, AstNode, NodeId, NodeStore, Role, StoreError, Which};

pub struct TreeBuilder {
    store: NodeStore,
    next: u32,
    error: Option<StoreError>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            store: NodeStore::new(),
            next: 1,
            error: None,
        }
    }

    /// Insert a node built by `f` from a blank node of kind `which`.
    pub fn push(
        &mut self,
        parent: Option<NodeId>,
        which: Which,
        role: Role,
        f: impl FnOnce(AstNode) -> AstNode,
    ) -> NodeId {
        let id = NodeId::new(self.next);
        self.next += 1;
        let mut node = AstNode::blank(id, which).with_role(role);
        node.parent = parent;
        if let Err(e) = self.store.insert(f(node)) {
            self.error.get_or_insert(e);
        }
        id
    }

    /// An action definition named `name`.
    pub fn action(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        let role = if parent.is_some() {
            Role::Statement
        } else {
            Role::None
        };
        self.push(parent, Which::Action(ActionWhich::Definition), role, |n| {
            n.with_name(name)
        })
    }

    pub fn child(&mut self, parent: NodeId, which: Which, role: Role) -> NodeId {
        self.push(Some(parent), which, role, |n| n)
    }

    pub fn named(&mut self, parent: NodeId, which: Which, role: Role, name: &str) -> NodeId {
        self.push(Some(parent), which, role, |n| n.with_name(name))
    }

    pub fn valued(&mut self, parent: NodeId, which: Which, role: Role, value: &str) -> NodeId {
        self.push(Some(parent), which, role, |n| n.with_value(value))
    }

    /// Access the store being built.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn finish(self) -> Result<NodeStore, StoreError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.store),
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
