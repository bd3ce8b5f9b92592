//! JSON AST ingestion.
//!
//! The parser front end hands over a flat list of node records, parents
//! before children:
//!
//! ```json
//! [
//!   { "id": 1, "which": "action.definition", "name": "run" },
//!   { "id": 2, "parent": 1, "which": "action.call", "role": "statement",
//!     "package": "System", "name": "print" },
//!   { "id": 3, "parent": 2, "which": "literal.string", "role": "argument", "value": "hi" }
//! ]
//! ```
//!
//! A document may also wrap the list as `{ "nodes": [...] }`.

use adhoc_ir::{AstNode, NodeId, NodeStore, Role, StoreError, Which};
use serde::Deserialize;

/// Environment variable sizing the store's backing map.
pub const NODE_COUNT_VAR: &str = "ADHOC_ESTIMATED_NODE_COUNT";

/// One node as the front end writes it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub id: u32,
    /// Parent id; absent or `0` for the root.
    #[serde(default)]
    pub parent: Option<u32>,
    pub which: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Nodes(Vec<NodeRecord>),
    Wrapped { nodes: Vec<NodeRecord> },
}

impl NodeRecord {
    fn into_node(self) -> Result<AstNode, StoreError> {
        let which: Which = self
            .which
            .parse()
            .map_err(|()| StoreError::UnknownWhich(self.which.clone()))?;
        let role = match self.role.as_deref() {
            Some(role) => role
                .parse()
                .map_err(|()| StoreError::UnknownRole(role.to_string()))?,
            None => Role::None,
        };
        let mut node = AstNode::blank(NodeId::new(self.id), which).with_role(role);
        node.parent = self.parent.filter(|&p| p != 0).map(NodeId::new);
        node.package = self.package;
        node.name = self.name;
        node.value = self.value;
        Ok(node)
    }
}

/// Size hint from [`NODE_COUNT_VAR`], else the store default.
pub fn estimated_node_count() -> usize {
    std::env::var(NODE_COUNT_VAR)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(NodeStore::DEFAULT_SIZE_HINT)
}

pub fn parse_records(json: &str) -> serde_json::Result<Vec<NodeRecord>> {
    let document: Document = serde_json::from_str(json)?;
    Ok(match document {
        Document::Nodes(nodes) | Document::Wrapped { nodes } => nodes,
    })
}

/// Insert `records` in order into a store sized for `size_hint` nodes.
pub fn build_store(records: Vec<NodeRecord>, size_hint: usize) -> Result<NodeStore, StoreError> {
    let mut store = NodeStore::with_capacity(size_hint.max(records.len()));
    for record in records {
        store.insert(record.into_node()?)?;
    }
    tracing::debug!(nodes = store.len(), "tree ingested");
    Ok(store)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use adhoc_ir::{ActionWhich, LiteralWhich};
    use pretty_assertions::assert_eq;

    use super::*;

    const PRINT_HI: &str = r#"[
        { "id": 1, "which": "action.definition", "name": "run" },
        { "id": 2, "parent": 1, "which": "action.call", "role": "statement",
          "package": "System", "name": "print" },
        { "id": 3, "parent": 2, "which": "literal.string", "role": "argument", "value": "hi" }
    ]"#;

    #[test]
    fn test_records_build_tree() {
        let store = build_store(parse_records(PRINT_HI).unwrap(), 16).unwrap();
        let root = store.root().unwrap();
        assert_eq!(root, NodeId::new(1));
        assert_eq!(store[root].which, Which::Action(ActionWhich::Definition));
        assert_eq!(store.children(root), &[NodeId::new(2)]);

        let hi = &store[NodeId::new(3)];
        assert_eq!(hi.which, Which::Literal(LiteralWhich::String));
        assert_eq!(hi.role, Role::Argument);
        assert_eq!(hi.value_str(), "hi");
        assert_eq!(store[NodeId::new(2)].package_str(), "System");
    }

    #[test]
    fn test_wrapped_document_and_zero_parent() {
        let json = r#"{ "nodes": [ { "id": 7, "parent": 0, "which": "action.definition" } ] }"#;
        let store = build_store(parse_records(json).unwrap(), 1).unwrap();
        assert_eq!(store.root(), Some(NodeId::new(7)));
    }

    #[test]
    fn test_unknown_which() {
        let json = r#"[ { "id": 1, "which": "action.teleport" } ]"#;
        let err = build_store(parse_records(json).unwrap(), 4).unwrap_err();
        assert_eq!(err, StoreError::UnknownWhich("action.teleport".to_string()));
    }

    #[test]
    fn test_unknown_role() {
        let json = r#"[
            { "id": 1, "which": "action.definition" },
            { "id": 2, "parent": 1, "which": "literal.int", "role": "sideways", "value": "1" }
        ]"#;
        let err = build_store(parse_records(json).unwrap(), 4).unwrap_err();
        assert_eq!(err, StoreError::UnknownRole("sideways".to_string()));
    }

    #[test]
    fn test_child_before_parent_is_rejected() {
        let json = r#"[
            { "id": 2, "parent": 1, "which": "literal.int", "value": "1" },
            { "id": 1, "which": "action.definition" }
        ]"#;
        let err = build_store(parse_records(json).unwrap(), 4).unwrap_err();
        assert_eq!(
            err,
            StoreError::MissingParent {
                node: NodeId::new(2),
                parent: NodeId::new(1)
            }
        );
    }

    #[test]
    fn test_malformed_json() {
        assert!(parse_records("{ \"id\": ").is_err());
        assert!(parse_records(r#"[ { "which": "action.definition" } ]"#).is_err());
    }
}
