//! Synthesized temporaries.
//!
//! Anonymous complex values need a name so a scope can release them. Three
//! kinds exist, each named after the node that produced it:
//!
//! | Kind | Name | Given to |
//! |------|------|----------|
//! | [`TempKind::Literal`] | `_tmp<id>` | complex literals not bound to a fresh declaration |
//! | [`TempKind::Return`] | `_ret<id>` | returns whose complex value is computed |
//! | [`TempKind::Result`] | `_res<id>` | complex call or concatenation results used as operands |
//!
//! Complex assignments also save the replaced value in a block-local
//! `_old<id>` named after the assignment (see [`swap_name`]). Source names
//! may not start with any of these prefixes.

use adhoc_ir::{
    ActionWhich, AssignWhich, ControlWhich, NodeId, NodeStore, OperatorWhich, Role, VariableWhich,
    Which,
};

use crate::{is_complex_node, ArcClassification};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TempKind {
    Literal,
    Return,
    Result,
}

impl TempKind {
    pub fn prefix(self) -> &'static str {
        match self {
            TempKind::Literal => "_tmp",
            TempKind::Return => "_ret",
            TempKind::Result => "_res",
        }
    }

    /// Name of the temporary synthesized for `node`.
    pub fn name_for(self, node: NodeId) -> String {
        format!("{}{}", self.prefix(), node.raw())
    }
}

/// Prefix of the block-local that holds a replaced complex value.
pub const SWAP_PREFIX: &str = "_old";

/// Prefixes the generator owns. A source name using one could collide
/// with a synthesized local.
pub const RESERVED_PREFIXES: [&str; 4] = ["_tmp", "_ret", "_res", SWAP_PREFIX];

/// The reserved prefix `name` starts with, if any.
pub fn reserved_prefix(name: &str) -> Option<&'static str> {
    RESERVED_PREFIXES
        .into_iter()
        .find(|prefix| name.starts_with(prefix))
}

/// Name of the swap local for complex assignment `assign`.
pub fn swap_name(assign: NodeId) -> String {
    format!("{SWAP_PREFIX}{}", assign.raw())
}

/// What a scope variable is, for declaration and release purposes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScopeVarKind {
    /// A named declaration in a body.
    Declaration,
    /// An action parameter; declared by the signature, not the body.
    Parameter,
    Temporary(TempKind),
}

/// Classify a registered scope variable.
pub fn scope_var_kind(store: &NodeStore, id: NodeId) -> ScopeVarKind {
    let node = &store[id];
    match node.which {
        Which::Variable(VariableWhich::Declare) if node.role == Role::Parameter => {
            ScopeVarKind::Parameter
        }
        Which::Variable(_) => ScopeVarKind::Declaration,
        Which::Control(ControlWhich::Return) => ScopeVarKind::Temporary(TempKind::Return),
        Which::Literal(_) => ScopeVarKind::Temporary(TempKind::Literal),
        _ => ScopeVarKind::Temporary(TempKind::Result),
    }
}

/// Calls, operators, and assignments compute a value; literals and
/// variables just name one.
pub fn is_compound(which: Which) -> bool {
    matches!(
        which,
        Which::Action(ActionWhich::Call) | Which::Operator(_) | Which::Assignment(_)
    )
}

/// Whether `id` produces a fresh complex reference when evaluated.
pub fn produces_fresh_value(store: &NodeStore, id: NodeId) -> bool {
    let node = &store[id];
    let fresh_kind = match node.which {
        Which::Action(ActionWhich::Call) => true,
        Which::Operator(OperatorWhich::Plus) => {
            node.resolved_type == Some(adhoc_ir::DataType::String)
        }
        _ => false,
    };
    fresh_kind && node.resolved_type.is_some_and(|ty| ty.is_complex())
}

/// Whether the value of `id` is consumed directly by its parent: assigned
/// to a named variable, returned, or discarded as a statement.
fn is_consumed_directly(store: &NodeStore, id: NodeId) -> bool {
    let node = &store[id];
    if node.role.is_body() || node.role == Role::Initialization {
        return true;
    }
    let Some(parent) = node.parent else {
        return true;
    };
    let parent = &store[parent];
    match parent.which {
        Which::Control(ControlWhich::Return) => true,
        Which::Assignment(AssignWhich::Equal) => {
            parent.children().get(1) == Some(&id)
                && parent
                    .children()
                    .first()
                    .is_some_and(|&target| matches!(store[target].which, Which::Variable(_)))
        }
        _ => false,
    }
}

/// Whether `id` needs a `_res` temporary: it yields a fresh complex value
/// that would otherwise be dropped without a release.
pub fn needs_result_temp(store: &NodeStore, id: NodeId) -> bool {
    produces_fresh_value(store, id) && !is_consumed_directly(store, id)
}

/// Whether `id` is a fresh complex value evaluated only for its effects.
pub fn is_discarded_result(store: &NodeStore, id: NodeId) -> bool {
    let node = &store[id];
    produces_fresh_value(store, id) && (node.role.is_body() || node.role == Role::Initialization)
}

/// Whether return `ret` needs a `_ret` temporary: its value is complex and
/// computed.
pub fn needs_return_temp(store: &NodeStore, ret: NodeId) -> bool {
    store
        .children(ret)
        .first()
        .is_some_and(|&value| is_compound(store[value].which) && is_complex_node(store, value))
}
