//! Lexical scope resolution.
//!
//! Scopes are anchored at action definitions and at the block-opening
//! control forms (if, loop, switch, case, fork). Each anchor's `scope` field
//! points at the anchor enclosing it, forming the chain that name lookup
//! walks. Lookup is strictly lexical: the nearest enclosing declaration
//! wins, and within one scope the first declaration of a name wins.
//!
//! A scope's `scope_vars` lists, in registration order, every value whose
//! lifetime the scope manages: declarations (including parameters) and the
//! temporaries synthesized for anonymous complex values.

use adhoc_ir::{AssignWhich, LiteralWhich, NodeId, NodeStore, Role, VariableWhich, Which};

/// What [`assign_scope`] did with a node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScopeOutcome {
    /// A variable use linked to its declaration.
    Resolved(NodeId),
    /// A variable use with no visible declaration.
    Unresolved,
    /// A repeated declaration in the same scope, linked to the first.
    Redeclared(NodeId),
    /// Registered as a new scope variable.
    Registered,
    /// Scope set; nothing to track.
    Scoped,
}

/// The scope chain starting at `from` (inclusive), innermost first.
pub fn scope_chain(store: &NodeStore, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(from), |&scope| store[scope].scope)
}

/// Nearest scope anchor strictly above `id` in the tree.
pub fn enclosing_scope(store: &NodeStore, id: NodeId) -> Option<NodeId> {
    store
        .ancestors(id)
        .find(|&ancestor| store[ancestor].which.is_scope_anchor())
}

/// Nearest action definition on the scope chain from `scope` (inclusive).
pub fn owning_action(store: &NodeStore, scope: NodeId) -> Option<NodeId> {
    scope_chain(store, scope)
        .find(|&s| matches!(store[s].which, Which::Action(adhoc_ir::ActionWhich::Definition)))
}

/// A declaration of `name` registered directly in `scope`.
pub fn find_in_scope(store: &NodeStore, name: &str, scope: NodeId) -> Option<NodeId> {
    store[scope].scope_vars.iter().copied().find(|&var| {
        let node = &store[var];
        node.which == Which::Variable(VariableWhich::Declare) && node.name_str() == name
    })
}

/// Nearest declaration of `name` visible from `from_scope`.
pub fn find_declaration(store: &NodeStore, name: &str, from_scope: NodeId) -> Option<NodeId> {
    scope_chain(store, from_scope).find_map(|scope| find_in_scope(store, name, scope))
}

/// Append `id` to `scope`'s variables unless it is already registered.
/// Returns whether it was appended.
pub fn register(store: &mut NodeStore, scope: NodeId, id: NodeId) -> bool {
    if store[id].registered {
        return false;
    }
    store[id].registered = true;
    store[scope].scope_vars.push(id);
    tracing::debug!(%id, %scope, label = %store[id].label(), "scope var registered");
    true
}

/// Whether `id` is a complex literal bound directly to a fresh declaration
/// (`x = "text"` where this is the first declaration of `x`).
///
/// Bound literals initialize their variable and need no temporary.
pub fn is_bound_literal(store: &NodeStore, id: NodeId) -> bool {
    let Some(parent) = store[id].parent else {
        return false;
    };
    let assign = &store[parent];
    if assign.which != Which::Assignment(AssignWhich::Equal) || assign.children().get(1) != Some(&id)
    {
        return false;
    }
    assign.children().first().is_some_and(|&target| {
        let target = &store[target];
        target.which == Which::Variable(VariableWhich::Declare)
            && target.role != Role::Parameter
            && target.reference.is_none()
    })
}

fn is_complex_literal(which: Which) -> bool {
    matches!(
        which,
        Which::Literal(
            LiteralWhich::String | LiteralWhich::Array | LiteralWhich::Hash | LiteralWhich::Struct
        )
    )
}

/// Place `id` in `scope`.
///
/// A variable use is linked to its declaration and shares that
/// declaration's scope. A declaration or an unbound complex literal is
/// registered in `scope`. Anything else just records `scope`.
pub fn assign_scope(store: &mut NodeStore, id: NodeId, scope: NodeId) -> ScopeOutcome {
    let which = store[id].which;
    match which {
        Which::Variable(VariableWhich::Eval) => {
            let found = find_declaration(store, store[id].name_str(), scope);
            let node_scope = found.and_then(|decl| store[decl].scope).unwrap_or(scope);
            let node = &mut store[id];
            node.reference = found;
            node.scope = Some(node_scope);
            match found {
                Some(decl) => ScopeOutcome::Resolved(decl),
                None => {
                    tracing::debug!(%id, name = node.name_str(), "no visible declaration");
                    ScopeOutcome::Unresolved
                }
            }
        }
        Which::Variable(VariableWhich::Declare) => {
            let existing = find_in_scope(store, store[id].name_str(), scope).filter(|&d| d != id);
            let node = &mut store[id];
            node.scope = Some(scope);
            match existing {
                Some(first) => {
                    node.reference = Some(first);
                    ScopeOutcome::Redeclared(first)
                }
                None => {
                    register(store, scope, id);
                    ScopeOutcome::Registered
                }
            }
        }
        _ if is_complex_literal(which) && !is_bound_literal(store, id) => {
            store[id].scope = Some(scope);
            register(store, scope, id);
            ScopeOutcome::Registered
        }
        _ => {
            store[id].scope = Some(scope);
            ScopeOutcome::Scoped
        }
    }
}
