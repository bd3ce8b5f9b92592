//! Release plans for scope exits.
//!
//! Every path out of a scope must release each complex scope variable it
//! owns exactly once. Three kinds of exit exist:
//!
//! - **Fallthrough**: control reaches the end of a scope. Its own complex
//!   variables are released in registration order.
//! - **Return**: every scope from the return out to its action is left at
//!   once. All their complex variables are released, innermost scope first,
//!   except the returned value, which is moved to the caller.
//! - **Jump** (`break`/`continue`): the scopes strictly inside the nearest
//!   loop are left. The loop's own variables outlive the jump.
//!
//! Plans are lists of scope-variable ids; the emitter maps each to its
//! binding name.

use adhoc_ir::{ActionWhich, ControlWhich, NodeId, NodeStore, Role, VariableWhich, Which};
use adhoc_scope::scope_chain;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::is_complex_node;

/// Scope variables to release (or retain), in order.
pub type ReleasePlan = SmallVec<[NodeId; 4]>;

fn complex_vars(store: &NodeStore, scope: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    store[scope]
        .scope_vars
        .iter()
        .copied()
        .filter(move |&var| is_complex_node(store, var))
}

fn is_action(which: Which) -> bool {
    which == Which::Action(ActionWhich::Definition)
}

/// Complex variables `scope` releases when control falls off its end.
pub fn fallthrough_releases(store: &NodeStore, scope: NodeId) -> ReleasePlan {
    let plan: ReleasePlan = complex_vars(store, scope).collect();
    trace!(%scope, releases = plan.len(), "fallthrough plan");
    plan
}

/// The scope variable whose reference a return hands to its caller.
///
/// This is the return's own `_ret` temporary when it has one, else the
/// declaration a returned variable refers to, else a returned literal's
/// temporary. Simple and valueless returns move nothing.
pub fn moved_value(store: &NodeStore, ret: NodeId) -> Option<NodeId> {
    if store[ret].temp_name.is_some() {
        return Some(ret);
    }
    let &value = store.children(ret).first()?;
    if !is_complex_node(store, value) {
        return None;
    }
    let node = &store[value];
    match node.which {
        Which::Variable(VariableWhich::Eval) => node.reference,
        Which::Literal(_) if node.registered => Some(value),
        _ => None,
    }
}

/// Complex variables released by return `ret`, innermost scope first.
pub fn return_releases(store: &NodeStore, ret: NodeId) -> ReleasePlan {
    let Some(scope) = store[ret].scope else {
        return ReleasePlan::new();
    };
    let moved = moved_value(store, ret);
    let mut plan = ReleasePlan::new();
    for s in scope_chain(store, scope) {
        plan.extend(complex_vars(store, s).filter(|&var| Some(var) != moved));
        if is_action(store[s].which) {
            break;
        }
    }
    trace!(%ret, moved = ?moved, releases = plan.len(), "return plan");
    plan
}

/// Complex variables released by `break`/`continue` node `jump`.
///
/// Returns `None` when no loop encloses the jump within its action.
pub fn jump_releases(store: &NodeStore, jump: NodeId) -> Option<ReleasePlan> {
    let scope = store[jump].scope?;
    let mut plan = ReleasePlan::new();
    for s in scope_chain(store, scope) {
        match store[s].which {
            Which::Control(ControlWhich::Loop) => {
                trace!(%jump, loop_scope = %s, releases = plan.len(), "jump plan");
                return Some(plan);
            }
            which if is_action(which) => break,
            _ => plan.extend(complex_vars(store, s)),
        }
    }
    debug!(%jump, "no enclosing loop for jump");
    None
}

/// Complex parameters of `action`, which the callee retains on entry.
pub fn parameter_retains(store: &NodeStore, action: NodeId) -> ReleasePlan {
    store
        .children_with_role(action, Role::Parameter)
        .filter(|&param| is_complex_node(store, param))
        .collect()
}

// Tests

#[cfg(test)]
mod tests;
