//! The emit phase.
//!
//! Walks the declared tree a second time and writes target text through
//! the backend's templates. Every annotation is final by now: types are
//! read with [`type_of`], scope variables and deferred stores are read
//! from their scopes, and release points come from [`adhoc_arc::exits`].
//!
//! # Scope layout
//!
//! Each scope declares its variables on entry: an action right after its
//! header, an `if` or loop right before its header. Complex variables are
//! initialized from their bound literal or to null. A literal bound in a
//! loop body is instead created by its own assignment, once per iteration.
//! Releases follow the scope's last statement (actions) or its closing
//! brace (control scopes).

mod expr;

use adhoc_arc::{
    fallthrough_releases, is_complex_node, jump_releases, ownership_of, parameter_retains,
    return_releases, scope_var_kind, swap_name, temps::is_compound, is_discarded_result,
    Ownership, ScopeVarKind, TempKind,
};
use adhoc_diagnostic::{no_target_equivalent, Diagnostic, ErrorCode, ErrorGuaranteed};
use adhoc_ir::{
    ActionWhich, AssignWhich, ControlWhich, DataType, LiteralWhich, NodeId, NodeStore,
    OperatorWhich, Role, VariableWhich, Which,
};
use adhoc_scope::is_bound_literal;
use adhoc_stack::ensure_sufficient_stack;
use adhoc_types::type_of;
use smallvec::SmallVec;

use crate::context::{CodeWriter, GenContext};
use crate::emitter::{Operand, Param, Signature};

pub(crate) use expr::emit_expr;
use expr::{emit_assign_expr, emit_operand, literal_creation};

type Children = SmallVec<[NodeId; 8]>;

fn children_of(store: &NodeStore, id: NodeId) -> Children {
    store.children(id).iter().copied().collect()
}

/// The `position`th child of `id`, or a malformed-node error.
pub(crate) fn child(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    position: usize,
) -> Result<NodeId, ErrorGuaranteed> {
    match store.children(id).get(position) {
        Some(&c) => Ok(c),
        None => Err(ctx.fail(adhoc_diagnostic::malformed_node(
            id,
            format!("`{}` is missing child {}", store[id].which, position + 1),
        ))),
    }
}

pub(crate) fn type_checked(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<DataType, ErrorGuaranteed> {
    ctx.check(type_of(store, id), id)
}

fn is_complex_literal(which: Which) -> bool {
    matches!(
        which,
        Which::Literal(
            LiteralWhich::String | LiteralWhich::Array | LiteralWhich::Hash | LiteralWhich::Struct
        )
    )
}

fn is_bound_complex_literal(store: &NodeStore, id: NodeId) -> bool {
    is_complex_literal(store[id].which) && is_bound_literal(store, id)
}

/// Whether bound literal `id` is assigned by a statement of a loop body.
/// Such a literal is created by its assignment on every iteration.
pub(crate) fn is_created_in_place(store: &NodeStore, id: NodeId) -> bool {
    if !is_bound_complex_literal(store, id) {
        return false;
    }
    let in_loop = store[id]
        .scope
        .is_some_and(|scope| store[scope].which == Which::Control(ControlWhich::Loop));
    in_loop && store[id].parent.is_some_and(|assign| store[assign].role.is_body())
}

/// Whether `id` is a complex literal that initializes its declaration at
/// scope entry, so its assignment statement emits nothing.
fn is_created_at_entry(store: &NodeStore, id: NodeId) -> bool {
    is_bound_complex_literal(store, id) && !is_created_in_place(store, id)
}

/// Action definitions in body position (the root and nested statements).
fn is_named_definition(store: &NodeStore, id: NodeId) -> bool {
    let node = &store[id];
    node.which == Which::Action(ActionWhich::Definition) && node.role.is_body()
}

// ── Module ──────────────────────────────────────────────────────

/// Emit the whole module rooted at `root`.
#[tracing::instrument(level = "debug", skip_all, fields(target = %ctx.emitter.target()))]
pub fn emit_module(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    root: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;

    let prologue = e.module_prologue(&ctx.module);
    for line in ctx.check(prologue, root)? {
        ctx.writeln(&line);
    }

    if e.hoists_actions() {
        let definitions: Vec<NodeId> = store
            .preorder()
            .into_iter()
            .map(|(id, _)| id)
            .filter(|&id| is_named_definition(store, id))
            .collect();

        let mut prototypes = Vec::with_capacity(definitions.len());
        for &def in &definitions {
            let sig = signature(ctx, store, def)?;
            let prototype = e.prototype(&ctx.module, &sig);
            if let Some(line) = ctx.check(prototype, def)? {
                prototypes.push(line);
            }
        }
        if !prototypes.is_empty() {
            if !ctx.out.is_empty() {
                ctx.out.newline();
            }
            for line in &prototypes {
                ctx.writeln(line);
            }
        }

        for def in definitions {
            if !ctx.out.is_empty() {
                ctx.out.newline();
            }
            emit_action(ctx, store, def)?;
        }
    } else {
        emit_action(ctx, store, root)?;
    }

    let epilogue = e.module_epilogue(&ctx.module);
    for line in ctx.check(epilogue, root)? {
        ctx.writeln(&line);
    }
    Ok(())
}

// ── Actions ─────────────────────────────────────────────────────

fn signature<'s>(
    ctx: &mut GenContext<'_>,
    store: &'s NodeStore,
    id: NodeId,
) -> Result<Signature<'s>, ErrorGuaranteed> {
    let returns = type_checked(ctx, store, id)?;
    let mut params = Vec::new();
    for param in store.children_with_role(id, Role::Parameter) {
        params.push(Param {
            name: store[param].name_str(),
            ty: type_checked(ctx, store, param)?,
        });
    }
    Ok(Signature {
        name: store[id].name_str(),
        returns,
        params,
        anonymous: !store[id].role.is_body(),
    })
}

/// Emit a full definition: header, body, footer.
#[tracing::instrument(level = "debug", skip_all, fields(action = %store[id].name_str()))]
fn emit_action(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    let sig = signature(ctx, store, id)?;

    if let Some(comment) = store[id]
        .value
        .as_deref()
        .filter(|v| !v.is_empty())
        .and_then(|v| e.action_comment(v))
    {
        ctx.writeln(&comment);
    }
    let header = e.function_header(&ctx.module, &sig);
    let header = ctx.check(header, id)?;
    ctx.writeln(&header);
    ctx.out.indent();
    emit_body(ctx, store, id)?;
    ctx.out.dedent();
    let footer = e.function_footer(&ctx.module, &sig);
    ctx.writeln(footer);
    Ok(())
}

/// Locals, parameter retains, statements, and fallthrough releases of
/// action `id`, at the current indentation.
pub(crate) fn emit_body(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    declare_scope_vars(ctx, store, id)?;

    if e.manages_lifetimes() {
        for param in parameter_retains(store, id) {
            let line = e.statement(&e.retain(store[param].name_str()));
            ctx.writeln(&line);
        }
    }

    let body: Children = store
        .children(id)
        .iter()
        .copied()
        .filter(|&c| store[c].role != Role::Parameter)
        .collect();
    for &statement in &body {
        emit_statement(ctx, store, statement)?;
    }

    let ends_in_return = body
        .last()
        .is_some_and(|&last| store[last].which == Which::Control(ControlWhich::Return));
    if e.manages_lifetimes() && !ends_in_return {
        emit_releases(ctx, store, &fallthrough_releases(store, id));
    }
    Ok(())
}

// ── Scopes ──────────────────────────────────────────────────────

/// Declare the variables `scope` owns.
fn declare_scope_vars(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    scope: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    let vars: Children = store[scope].scope_vars.iter().copied().collect();
    for var in vars {
        let node = &store[var];
        let init = match scope_var_kind(store, var) {
            ScopeVarKind::Parameter => continue,
            ScopeVarKind::Declaration => match bound_literal(store, var) {
                Some(literal) => Some(literal_creation(ctx, store, literal)?),
                None if e.manages_lifetimes() && is_complex_node(store, var) => {
                    Some(e.null_value().to_string())
                }
                None => None,
            },
            ScopeVarKind::Temporary(TempKind::Literal) => {
                if e.inline_strings() && node.which == Which::Literal(LiteralWhich::String) {
                    continue;
                }
                Some(literal_creation(ctx, store, var)?)
            }
            ScopeVarKind::Temporary(TempKind::Return | TempKind::Result) => {
                Some(e.null_value().to_string())
            }
        };
        let ty = type_checked(ctx, store, var)?;
        let line = e.local(ty, node.binding_name(), init.as_deref());
        let line = ctx.check(line, var)?;
        ctx.writeln(&line);
    }
    Ok(())
}

/// The complex literal that initializes declaration `decl` at scope entry.
fn bound_literal(store: &NodeStore, decl: NodeId) -> Option<NodeId> {
    let parent = store[decl].parent?;
    let assign = &store[parent];
    if assign.which != Which::Assignment(AssignWhich::Equal) || assign.children().first() != Some(&decl)
    {
        return None;
    }
    let &value = assign.children().get(1)?;
    is_created_at_entry(store, value).then_some(value)
}

/// Name a complex literal is reachable through: its temporary, or the
/// declaration it is bound to.
pub(crate) fn container_name(store: &NodeStore, literal: NodeId) -> Option<String> {
    if let Some(temp) = store[literal].temp_name.as_deref() {
        return Some(temp.to_string());
    }
    if !is_bound_literal(store, literal) {
        return None;
    }
    let assign = store[literal].parent?;
    let &target = store.children(assign).first()?;
    Some(store[target].name_str().to_string())
}

/// Element stores queued in `scope` for `statement`.
fn emit_deferred_stores(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    scope: NodeId,
    statement: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let literals: Children = store[scope]
        .deferred_stores
        .iter()
        .filter(|pending| pending.statement == statement)
        .map(|pending| pending.literal)
        .filter(|&literal| !is_created_in_place(store, literal))
        .collect();

    for literal in literals {
        emit_element_stores(ctx, store, literal)?;
    }
    Ok(())
}

/// One store per element of container literal `literal`.
fn emit_element_stores(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    literal: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    let Some(container) = container_name(store, literal) else {
        return Err(ctx.fail(adhoc_diagnostic::malformed_node(
            literal,
            "container literal has no name to store through",
        )));
    };
    let is_array = store[literal].resolved_type == Some(DataType::Array);
    for (position, element) in children_of(store, literal).into_iter().enumerate() {
        let key = if is_array {
            position.to_string()
        } else {
            e.member_key(store[element].name_str())
        };
        let value = Operand::new(
            emit_expr(ctx, store, element)?,
            type_checked(ctx, store, element)?,
        );
        let line = e.statement(&e.store_element(&container, &key, &value));
        ctx.writeln(&line);
    }
    Ok(())
}

fn emit_releases(ctx: &mut GenContext<'_>, store: &NodeStore, vars: &[NodeId]) {
    let e = ctx.emitter;
    for &var in vars {
        let line = e.statement(&e.release(store[var].binding_name()));
        ctx.writeln(&line);
    }
}

// ── Statements ──────────────────────────────────────────────────

/// Emit `id` in statement position.
pub(crate) fn emit_statement(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    ensure_sufficient_stack(|| emit_statement_inner(ctx, store, id))
}

fn emit_statement_inner(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    let which = store[id].which;

    if let Which::Control(form @ (ControlWhich::Switch | ControlWhich::Case | ControlWhich::Fork)) =
        which
    {
        return Err(ctx.fail(
            Diagnostic::error(ErrorCode::E3001)
                .with_message(format!(
                    "`{}` statements are not supported by the {} backend",
                    Which::Control(form).name().trim_start_matches("control."),
                    e.target()
                ))
                .with_node(id),
        ));
    }

    let opens_control_scope = which.is_scope_anchor() && which.kind() == adhoc_ir::NodeKind::Control;
    if opens_control_scope {
        declare_scope_vars(ctx, store, id)?;
        emit_deferred_stores(ctx, store, id, id)?;
    } else if let Some(scope) = store[id].scope {
        emit_deferred_stores(ctx, store, scope, id)?;
    }

    match which {
        Which::Null => Err(ctx.fail(
            Diagnostic::error(ErrorCode::E1001)
                .with_message("placeholder node reached emission")
                .with_node(id),
        )),
        Which::Action(ActionWhich::Definition) => {
            if e.hoists_actions() {
                Ok(())
            } else {
                emit_action(ctx, store, id)
            }
        }
        Which::Group => {
            for statement in children_of(store, id) {
                emit_statement(ctx, store, statement)?;
            }
            Ok(())
        }
        Which::Control(ControlWhich::If) => emit_if(ctx, store, id),
        Which::Control(ControlWhich::Loop) => emit_loop(ctx, store, id),
        Which::Control(ControlWhich::Else) => Err(ctx.fail(adhoc_diagnostic::malformed_node(
            id,
            "`else` outside of an `if`",
        ))),
        Which::Control(jump @ (ControlWhich::Break | ControlWhich::Continue)) => {
            if e.manages_lifetimes() {
                let plan = jump_releases(store, id).unwrap_or_default();
                emit_releases(ctx, store, &plan);
            }
            ctx.writeln(e.jump(jump));
            Ok(())
        }
        Which::Control(_) => emit_return(ctx, store, id),
        Which::Assignment(op) => emit_assignment(ctx, store, id, op),
        // Declarations are emitted at scope entry.
        Which::Variable(VariableWhich::Declare) => Ok(()),
        Which::Literal(_) if is_complex_literal(which) => Ok(()),
        _ => {
            let text = emit_expr(ctx, store, id)?;
            let text = if e.manages_lifetimes() && is_discarded_result(store, id) {
                e.release(&text)
            } else {
                text
            };
            ctx.writeln(&e.statement(&text));
            Ok(())
        }
    }
}

fn emit_block(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    statements: &[NodeId],
) -> Result<(), ErrorGuaranteed> {
    ctx.out.indent();
    for &statement in statements {
        emit_statement(ctx, store, statement)?;
    }
    ctx.out.dedent();
    Ok(())
}

fn emit_if(ctx: &mut GenContext<'_>, store: &NodeStore, id: NodeId) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    let Some(cond) = store.children_with_role(id, Role::Condition).next() else {
        return Err(ctx.fail(adhoc_diagnostic::malformed_node(id, "`if` has no condition")));
    };
    let cond = emit_expr(ctx, store, cond)?;

    let mut then: Children = SmallVec::new();
    let mut otherwise = None;
    for c in children_of(store, id) {
        match (store[c].role, store[c].which) {
            (Role::Condition, _) => {}
            (_, Which::Control(ControlWhich::Else)) => otherwise = Some(c),
            _ => then.push(c),
        }
    }

    ctx.writeln(&e.if_header(&cond));
    emit_block(ctx, store, &then)?;
    if let Some(otherwise) = otherwise {
        ctx.writeln(e.else_header());
        emit_block(ctx, store, &children_of(store, otherwise))?;
    }
    ctx.writeln(e.block_close());

    if e.manages_lifetimes() {
        emit_releases(ctx, store, &fallthrough_releases(store, id));
    }
    Ok(())
}

fn emit_loop(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    // A complex initializer runs as a statement ahead of the header, where
    // assignments can swap and discarded results can be released.
    let init = match store.children_with_role(id, Role::Initialization).next() {
        Some(init) if is_complex_node(store, init) => {
            emit_statement(ctx, store, init)?;
            String::new()
        }
        Some(init) => emit_expr(ctx, store, init)?,
        None => String::new(),
    };
    let cond = match store.children_with_role(id, Role::Condition).next() {
        Some(cond) => emit_expr(ctx, store, cond)?,
        None => String::new(),
    };
    let body: Children = store
        .children(id)
        .iter()
        .copied()
        .filter(|&c| !matches!(store[c].role, Role::Initialization | Role::Condition))
        .collect();

    ctx.writeln(&e.loop_header(&init, &cond));
    emit_block(ctx, store, &body)?;
    ctx.writeln(e.block_close());

    if e.manages_lifetimes() {
        emit_releases(ctx, store, &fallthrough_releases(store, id));
    }
    Ok(())
}

/// Emit a return, moving its value out and releasing everything else.
fn emit_return(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    if let Err(state) = ctx.return_states.mark_emitted(store, id) {
        return Err(ctx.fail(adhoc_diagnostic::malformed_node(
            id,
            format!("return reached emission in state {state:?}"),
        )));
    }
    let value = store.children(id).first().copied();

    if !e.manages_lifetimes() {
        let text = value.map(|v| emit_expr(ctx, store, v)).transpose()?;
        ctx.writeln(&e.return_stmt(text.as_deref()));
        return Ok(());
    }

    let releases = return_releases(store, id);
    let Some(value) = value else {
        emit_releases(ctx, store, &releases);
        ctx.writeln(&e.return_stmt(None));
        return Ok(());
    };

    let text = emit_expr(ctx, store, value)?;

    // Complex computed value: capture it in the return temporary.
    if let Some(temp) = store[id].temp_name.as_deref() {
        let owned = match ownership_of(store, value) {
            Ownership::Owned => text,
            Ownership::Borrowed => e.retain(&text),
        };
        ctx.writeln(&e.statement(&format!("{temp} = {owned}")));
        emit_releases(ctx, store, &releases);
        ctx.writeln(&e.return_stmt(Some(temp)));
        return Ok(());
    }

    // Named complex values and simple leaves survive the releases.
    if releases.is_empty() || is_complex_node(store, value) || !is_compound(store[value].which) {
        emit_releases(ctx, store, &releases);
        ctx.writeln(&e.return_stmt(Some(&text)));
        return Ok(());
    }

    // Simple computed value: evaluate before releasing what it reads.
    let ty = type_checked(ctx, store, value)?;
    let temp = TempKind::Return.name_for(id);
    let local = e.local(ty, &temp, Some(&text));
    let local = ctx.check(local, id)?;
    ctx.writeln(e.block_open());
    ctx.out.indent();
    ctx.writeln(&local);
    emit_releases(ctx, store, &releases);
    ctx.writeln(&e.return_stmt(Some(&temp)));
    ctx.out.dedent();
    ctx.writeln(e.block_close());
    Ok(())
}

/// Emit an assignment statement.
///
/// Complex targets are replaced through a swap block so the old value is
/// released after the new one is in place:
///
/// ```text
/// {
///     adhoc_data* _old<id> = s;
///     s = <owned value>;
///     adhoc_release(_old<id>);
/// }
/// ```
///
/// A literal created in place is followed by its element stores.
fn emit_assignment(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    op: AssignWhich,
) -> Result<(), ErrorGuaranteed> {
    let e = ctx.emitter;
    let target = child(ctx, store, id, 0)?;
    let value = store.children(id).get(1).copied();

    if op == AssignWhich::Equal && value.is_some_and(|v| is_created_at_entry(store, v)) {
        return Ok(());
    }
    let created = value.filter(|&v| op == AssignWhich::Equal && is_created_in_place(store, v));

    let is_element = store[target].which == Which::Operator(OperatorWhich::Index);
    let target_ty = type_checked(ctx, store, target)?;
    if is_element || !e.manages_lifetimes() || !is_complex_node(store, target) {
        let text = emit_assign_expr(ctx, store, id, op)?;
        ctx.writeln(&e.statement(&text));
        if let Some(literal) = created {
            emit_element_stores(ctx, store, literal)?;
        }
        return Ok(());
    }

    let name = emit_expr(ctx, store, target)?;
    let owned = match (op, value) {
        (AssignWhich::Equal, Some(value)) => {
            let text = emit_expr(ctx, store, value)?;
            if created.is_some() || ownership_of(store, value) == Ownership::Owned {
                text
            } else {
                e.retain(&text)
            }
        }
        (AssignWhich::Plus, Some(value)) if target_ty == DataType::String => {
            let lhs = Operand::new(name.clone(), target_ty);
            let rhs = Operand::new(
                emit_operand(ctx, store, value)?,
                type_checked(ctx, store, value)?,
            );
            let concat = e.binary(OperatorWhich::Plus, &lhs, &rhs, DataType::String);
            ctx.check(concat, id)?
        }
        _ => {
            return Err(ctx.fail(
                no_target_equivalent(
                    e.target().name(),
                    format!("`{}` on a {target_ty} value", op.symbol()),
                )
                .with_node(id),
            ))
        }
    };

    let old = swap_name(id);
    let saved = e.local(target_ty, &old, Some(&name));
    let saved = ctx.check(saved, id)?;
    ctx.writeln(e.block_open());
    ctx.out.indent();
    ctx.writeln(&saved);
    ctx.writeln(&e.statement(&format!("{name} = {owned}")));
    ctx.writeln(&e.statement(&e.release(&old)));
    ctx.out.dedent();
    ctx.writeln(e.block_close());
    if let Some(literal) = created {
        emit_element_stores(ctx, store, literal)?;
    }
    Ok(())
}

/// Render the body of action `id` one level below the current indentation,
/// for use inside an expression.
pub(crate) fn render_body(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    let level = ctx.out.level();
    let saved = std::mem::replace(&mut ctx.out, CodeWriter::at_level(level + 1));
    let result = emit_body(ctx, store, id);
    let mut body = std::mem::replace(&mut ctx.out, saved);
    result?;
    Ok(body.take_output())
}

// Tests
