//! Text dump of a node store.

use std::fmt::Write;

use crate::NodeStore;

/// Render the tree depth-first, three spaces of indent per level.
///
/// The root is prefixed `## `, nodes with children `+- `, leaves `-- `.
/// Each line shows the node label, its role, and its resolved type once known.
pub fn render_tree(store: &NodeStore) -> String {
    let mut out = String::new();
    for (id, depth) in store.preorder() {
        let node = &store[id];
        let marker = if depth == 0 {
            "## "
        } else if node.children().is_empty() {
            "-- "
        } else {
            "+- "
        };
        let _ = write!(out, "{:width$}{marker}{} [{}]", "", node.label(), node.role, width = depth * 3);
        if let Some(ty) = node.resolved_type {
            let _ = write!(out, " : {ty}");
        }
        if let Some(temp) = &node.temp_name {
            let _ = write!(out, " ({temp})");
        }
        out.push('\n');
    }
    out
}
