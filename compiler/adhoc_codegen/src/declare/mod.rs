//! The declare phase.
//!
//! A single preorder walk that annotates every node in place:
//!
//! 1. **Scope**: the node is placed in its nearest enclosing scope, and
//!    variable uses are linked to their declarations.
//! 2. **Type**: after the node's children are declared, its type is
//!    inferred from theirs. Calls take their callee's type, declaring the
//!    callee on demand.
//! 3. **Lifetime**: anonymous complex values get their temporary names and
//!    container literals queue their element stores.
//!
//! A subtree is fully declared before any ancestor reads its scope's
//! variables. Declaring a node twice is a no-op.

use adhoc_arc::{jump_releases, needs_result_temp, needs_return_temp, reserved_prefix, TempKind};
use adhoc_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed};
use adhoc_ir::builtins::{find_library_call, is_library_package};
use adhoc_ir::{
    ActionWhich, ControlWhich, DataType, DeferredStore, LiteralWhich, NodeId, NodeStore, Role,
    VariableWhich, Which,
};
use adhoc_scope::{assign_scope, enclosing_scope, owning_action, register, ScopeOutcome};
use adhoc_stack::ensure_sufficient_stack;
use adhoc_types::{infer_node, type_of};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::context::GenContext;

type Children = SmallVec<[NodeId; 8]>;

fn children_of(store: &NodeStore, id: NodeId) -> Children {
    store.children(id).iter().copied().collect()
}

/// Declare `id` and its subtree.
pub fn declare_node(
    ctx: &mut GenContext<'_>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    ensure_sufficient_stack(|| declare_inner(ctx, store, id))
}

fn declare_inner(
    ctx: &mut GenContext<'_>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    if store[id].declared {
        return Ok(());
    }
    store[id].declared = true;

    let which = store[id].which;
    if which == Which::Null {
        return Err(ctx.fail(
            Diagnostic::error(ErrorCode::E1001)
                .with_message("placeholder node must be replaced before generation")
                .with_node(id),
        ));
    }

    if which == Which::Variable(VariableWhich::Declare) {
        if let Some(prefix) = reserved_prefix(store[id].name_str()) {
            return Err(ctx.fail(
                Diagnostic::error(ErrorCode::E1004)
                    .with_message(format!(
                        "`{}` starts with `{prefix}`, which is reserved for generated locals",
                        store[id].name_str()
                    ))
                    .with_node(id),
            ));
        }
    }

    if let Some(scope) = enclosing_scope(store, id) {
        let outcome = assign_scope(store, id, scope);
        if let ScopeOutcome::Redeclared(first) = outcome {
            trace!(%id, %first, "redeclaration shares the first declaration");
        }
    }

    match which {
        Which::Action(ActionWhich::Definition) => return declare_action(ctx, store, id),
        Which::Action(ActionWhich::Call) => {
            declare_children(ctx, store, id)?;
            let ty = type_call(ctx, store, id)?;
            store[id].resolved_type = Some(ty);
        }
        Which::Control(ControlWhich::Return) => declare_return(ctx, store, id)?,
        Which::Control(jump @ (ControlWhich::Break | ControlWhich::Continue)) => {
            if jump_releases(store, id).is_none() {
                let keyword = if jump == ControlWhich::Break {
                    "break"
                } else {
                    "continue"
                };
                return Err(ctx.fail(
                    Diagnostic::error(ErrorCode::E1003)
                        .with_message(format!("`{keyword}` outside of a loop"))
                        .with_node(id),
                ));
            }
        }
        // Parameter children are defaults read only for typing.
        Which::Variable(VariableWhich::Declare) if store[id].role == Role::Parameter => {
            let inferred = infer_node(store, id);
            ctx.check(inferred, id)?;
        }
        _ => {
            declare_children(ctx, store, id)?;
            let inferred = infer_node(store, id);
            ctx.check(inferred, id)?;
        }
    }

    annotate_lifetime(ctx, store, id);
    Ok(())
}

fn declare_children(
    ctx: &mut GenContext<'_>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    for child in children_of(store, id) {
        declare_node(ctx, store, child)?;
    }
    Ok(())
}

#[tracing::instrument(level = "debug", skip_all, fields(action = %store[id].name_str()))]
fn declare_action(
    ctx: &mut GenContext<'_>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    ctx.begin_action(id);
    let declared = declare_children(ctx, store, id);
    let finished = ctx.end_action(id);
    declared?;
    let ty = ctx.check(finished, id)?;
    store[id].resolved_type = Some(ty);
    debug!(%id, %ty, "action declared");
    Ok(())
}

fn declare_return(
    ctx: &mut GenContext<'_>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    declare_children(ctx, store, id)?;
    let inferred = infer_node(store, id);
    ctx.check(inferred, id)?;

    let scope = store[id].scope;
    let Some((scope, action)) = scope.and_then(|s| owning_action(store, s).map(|a| (s, a))) else {
        return Err(ctx.fail(
            Diagnostic::error(ErrorCode::E1002)
                .with_message("`return` outside of an action")
                .with_node(id),
        ));
    };
    let has_value = !store.children(id).is_empty();
    let ty = store[id].resolved_type.unwrap_or(DataType::Void);
    ctx.record_return(action, id, has_value, ty);

    if ctx.emitter.manages_lifetimes() && needs_return_temp(store, id) {
        let name = TempKind::Return.name_for(id);
        debug!(%id, %name, "return temporary synthesized");
        store[id].temp_name = Some(name);
        register(store, scope, id);
    }
    Ok(())
}

/// Type of a call: the library table's result type for `System` calls,
/// else the callee's return type.
fn type_call(
    ctx: &mut GenContext<'_>,
    store: &mut NodeStore,
    id: NodeId,
) -> Result<DataType, ErrorGuaranteed> {
    let node = &store[id];
    if is_library_package(node.package.as_deref()) {
        return type_library_call(ctx, store, id);
    }

    let name = node.name_str().to_string();
    let package = node.package.clone();
    match ctx.find_definition(store, package.as_deref(), &name) {
        Some(def) if ctx.is_in_progress(def) => {
            let ty = ctx.provisional_type(def);
            trace!(%id, callee = %def, %ty, "recursive call typed provisionally");
            Ok(ty)
        }
        Some(def) => {
            declare_node(ctx, store, def)?;
            Ok(store[def].resolved_type.unwrap_or(DataType::Void))
        }
        None => {
            warn!(%id, callee = %name, "call target has no definition; typing it Void");
            Ok(DataType::Void)
        }
    }
}

fn type_library_call(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<DataType, ErrorGuaranteed> {
    let name = store[id].name_str();
    let Some(def) = find_library_call(name) else {
        return Err(ctx.fail(
            Diagnostic::error(ErrorCode::E4001)
                .with_message(format!("unknown library call `System.{name}`"))
                .with_node(id),
        ));
    };

    let args: Children = store.children_with_role(id, Role::Argument).collect();
    if !def.accepts_count(args.len()) {
        return Err(ctx.fail(
            Diagnostic::error(ErrorCode::E4002)
                .with_message(format!(
                    "`{name}` takes {}, found {}",
                    def.arity(),
                    args.len()
                ))
                .with_node(id),
        ));
    }

    for (position, &arg) in args.iter().enumerate() {
        let ty = ctx.check(type_of(store, arg), arg)?;
        let Some(spec) = def.param(position) else {
            continue;
        };
        if !spec.accepts(ty) {
            return Err(ctx.fail(
                Diagnostic::error(ErrorCode::E4003)
                    .with_message(format!(
                        "argument {} of `{name}` must be {spec}, found {ty}",
                        position + 1
                    ))
                    .with_node(arg),
            ));
        }
    }
    Ok(def.returns)
}

fn is_complex_literal(which: Which) -> bool {
    matches!(
        which,
        Which::Literal(
            LiteralWhich::String | LiteralWhich::Array | LiteralWhich::Hash | LiteralWhich::Struct
        )
    )
}

/// The statement a node belongs to: the nearest node, itself included,
/// that sits in a body position.
pub(crate) fn statement_of(store: &NodeStore, id: NodeId) -> NodeId {
    std::iter::once(id)
        .chain(store.ancestors(id))
        .find(|&n| store[n].role.is_body())
        .unwrap_or(id)
}

/// Name anonymous complex values and queue container element stores.
fn annotate_lifetime(ctx: &GenContext<'_>, store: &mut NodeStore, id: NodeId) {
    let node = &store[id];
    let Some(scope) = node.scope else {
        return;
    };

    if is_complex_literal(node.which) {
        let queue_stores =
            node.resolved_type.is_some_and(DataType::is_container) && !node.children().is_empty();
        if node.registered {
            let name = TempKind::Literal.name_for(id);
            debug!(%id, %name, "literal temporary synthesized");
            store[id].temp_name = Some(name);
        }
        if queue_stores {
            let statement = statement_of(store, id);
            store[scope].deferred_stores.push(DeferredStore {
                statement,
                literal: id,
            });
        }
        return;
    }

    if ctx.emitter.manages_lifetimes() && needs_result_temp(store, id) {
        let name = TempKind::Result.name_for(id);
        debug!(%id, %name, "result temporary synthesized");
        store[id].temp_name = Some(name);
        register(store, scope, id);
    }
}

// Tests
