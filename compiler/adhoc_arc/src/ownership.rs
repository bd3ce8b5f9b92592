//! Ownership of expression values.
//!
//! Evaluating an expression either yields a reference the evaluator now
//! owns, or exposes one that something else (a scope variable, a
//! container) keeps owning. The distinction decides whether storing the
//! value into a variable needs a retain.

use adhoc_ir::{NodeId, NodeStore, OperatorWhich, Which};

use crate::temps::produces_fresh_value;

/// Ownership status of an evaluated value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Fresh reference; storing it transfers ownership.
    Owned,
    /// Shared reference; storing it needs a retain.
    Borrowed,
}

/// Ownership of the value `id` evaluates to.
///
/// A fresh result that was given a `_res` temporary is owned by that
/// temporary, so reading it is a borrow. A ternary is owned only when both
/// branches are.
pub fn ownership_of(store: &NodeStore, id: NodeId) -> Ownership {
    let node = &store[id];
    if node.temp_name.is_some() {
        return Ownership::Borrowed;
    }
    if node.which == Which::Operator(OperatorWhich::Ternary) {
        let branches = store.children(id).get(1..3).unwrap_or_default();
        let both_owned = branches.len() == 2
            && branches
                .iter()
                .all(|&branch| ownership_of(store, branch) == Ownership::Owned);
        return if both_owned {
            Ownership::Owned
        } else {
            Ownership::Borrowed
        };
    }
    if produces_fresh_value(store, id) {
        Ownership::Owned
    } else {
        Ownership::Borrowed
    }
}
