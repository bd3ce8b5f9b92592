//! Expression emission.

use adhoc_arc::is_complex_node;
use adhoc_diagnostic::{no_target_equivalent, Diagnostic, ErrorCode, ErrorGuaranteed};
use adhoc_ir::builtins::{find_library_call, is_library_package};
use adhoc_ir::{
    ActionWhich, AssignWhich, DataType, LiteralWhich, NodeId, NodeStore, OperatorWhich, Role,
    VariableWhich, Which,
};
use adhoc_scope::{enclosing_scope, owning_action};
use adhoc_stack::ensure_sufficient_stack;

use super::{
    child, container_name, is_created_in_place, render_body, signature, type_checked,
};
use crate::context::GenContext;
use crate::emitter::Operand;

/// Emit `id` in expression position.
pub(crate) fn emit_expr(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    ensure_sufficient_stack(|| emit_expr_inner(ctx, store, id))
}

fn emit_expr_inner(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    match store[id].which {
        Which::Null => Err(ctx.fail(
            Diagnostic::error(ErrorCode::E1001)
                .with_message("placeholder node reached emission")
                .with_node(id),
        )),
        Which::Literal(kind) => emit_literal(ctx, store, id, kind),
        Which::Variable(kind) => emit_variable(ctx, store, id, kind),
        Which::Operator(op) => {
            let text = emit_operator(ctx, store, id, op)?;
            Ok(with_result_temp(ctx, store, id, text))
        }
        Which::Assignment(op) => emit_assign_expr(ctx, store, id, op),
        Which::Action(ActionWhich::Call) => {
            let text = emit_call(ctx, store, id)?;
            Ok(with_result_temp(ctx, store, id, text))
        }
        Which::Action(ActionWhich::Definition) => emit_function_value(ctx, store, id),
        which @ (Which::Group | Which::Control(_)) => Err(ctx.fail(
            adhoc_diagnostic::malformed_node(id, format!("`{which}` cannot be used as a value")),
        )),
    }
}

/// Operand text, parenthesized when it is itself an operation.
pub(crate) fn emit_operand(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    let text = emit_expr(ctx, store, id)?;
    let node = &store[id];
    let grouped = node.temp_name.is_some()
        || matches!(
            node.which,
            Which::Operator(OperatorWhich::Index | OperatorWhich::Ternary)
        );
    let needs_parens = !grouped && matches!(node.which, Which::Operator(_) | Which::Assignment(_));
    Ok(if needs_parens { format!("({text})") } else { text })
}

fn typed_operand(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<Operand, ErrorGuaranteed> {
    let text = emit_operand(ctx, store, id)?;
    Ok(Operand::new(text, type_checked(ctx, store, id)?))
}

/// Route a fresh intermediate through its result temporary, releasing the
/// previous value first.
fn with_result_temp(ctx: &GenContext<'_>, store: &NodeStore, id: NodeId, text: String) -> String {
    match store[id].temp_name.as_deref() {
        Some(temp) => format!("({}, {temp} = {text})", ctx.emitter.release(temp)),
        None => text,
    }
}

// ── Literals ────────────────────────────────────────────────────

fn emit_literal(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    kind: LiteralWhich,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    let text = store[id].value_str().trim();
    match kind {
        LiteralWhich::Bool => {
            let normalized = match text {
                "true" | "1" => "true",
                "false" | "0" | "" => "false",
                _ => return Err(invalid_literal(ctx, id, "bool", text)),
            };
            Ok(e.scalar_literal(kind, normalized))
        }
        LiteralWhich::Int => {
            let Ok(value) = text.parse::<i64>() else {
                return Err(invalid_literal(ctx, id, "int", text));
            };
            let range = e.int_range();
            if !range.contains(&value) {
                return Err(ctx.fail(
                    no_target_equivalent(
                        e.target().name(),
                        format!(
                            "int literal `{text}` (outside {}..={})",
                            range.start(),
                            range.end()
                        ),
                    )
                    .with_node(id),
                ));
            }
            Ok(e.scalar_literal(kind, text))
        }
        LiteralWhich::Float => {
            if text.parse::<f64>().is_err() {
                return Err(invalid_literal(ctx, id, "float", text));
            }
            Ok(e.scalar_literal(kind, text))
        }
        LiteralWhich::String if e.inline_strings() => Ok(e.string_literal(store[id].value_str())),
        LiteralWhich::String | LiteralWhich::Array | LiteralWhich::Hash | LiteralWhich::Struct => {
            if is_created_in_place(store, id) {
                return literal_creation(ctx, store, id);
            }
            match container_name(store, id) {
                Some(name) => Ok(name),
                None => literal_creation(ctx, store, id),
            }
        }
    }
}

fn invalid_literal(ctx: &mut GenContext<'_>, id: NodeId, kind: &str, text: &str) -> ErrorGuaranteed {
    ctx.fail(adhoc_diagnostic::malformed_node(
        id,
        format!("invalid {kind} literal `{text}`"),
    ))
}

/// Expression creating complex literal `id`, without its elements.
pub(crate) fn literal_creation(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    let node = &store[id];
    if node.which == Which::Literal(LiteralWhich::String) {
        return Ok(e.string_literal(node.value_str()));
    }
    let ty = type_checked(ctx, store, id)?;
    let element = node.element_type.unwrap_or(DataType::Void);
    let created = e.create_container(ty, element, node.children().len());
    ctx.check(created, id)
}

// ── Variables ───────────────────────────────────────────────────

fn emit_variable(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    kind: VariableWhich,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    let node = &store[id];
    if kind == VariableWhich::Eval && e.hoists_actions() {
        if let Some(decl) = node.reference {
            let declared_in = store[decl].scope.and_then(|s| owning_action(store, s));
            let used_in = enclosing_scope(store, id).and_then(|s| owning_action(store, s));
            if declared_in != used_in {
                return Err(ctx.fail(
                    no_target_equivalent(
                        e.target().name(),
                        format!("reading `{}` from an enclosing action", node.name_str()),
                    )
                    .with_node(id),
                ));
            }
        }
    }
    Ok(node.name_str().to_string())
}

// ── Operators ───────────────────────────────────────────────────

fn emit_operator(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    op: OperatorWhich,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    match op {
        OperatorWhich::Index => {
            let (container, index) = (child(ctx, store, id, 0)?, child(ctx, store, id, 1)?);
            let container = emit_operand(ctx, store, container)?;
            let index = emit_expr(ctx, store, index)?;
            let ty = type_checked(ctx, store, id)?;
            let loaded = e.load_element(&container, &index, ty);
            ctx.check(loaded, id)
        }
        OperatorWhich::Not => {
            let operand = child(ctx, store, id, 0)?;
            let operand = emit_operand(ctx, store, operand)?;
            Ok(e.not(&operand))
        }
        OperatorWhich::Ternary => {
            let cond = child(ctx, store, id, 0)?;
            let then = child(ctx, store, id, 1)?;
            let other = child(ctx, store, id, 2)?;
            let cond = emit_expr(ctx, store, cond)?;
            let then = emit_expr(ctx, store, then)?;
            let other = emit_expr(ctx, store, other)?;
            Ok(e.ternary(&cond, &then, &other))
        }
        _ => {
            let (lhs, rhs) = (child(ctx, store, id, 0)?, child(ctx, store, id, 1)?);
            let lhs = typed_operand(ctx, store, lhs)?;
            let rhs = typed_operand(ctx, store, rhs)?;
            let result = type_checked(ctx, store, id)?;
            let text = e.binary(op, &lhs, &rhs, result);
            ctx.check(text, id)
        }
    }
}

// ── Assignments ─────────────────────────────────────────────────

/// Assignment `id` as an expression. Complex targets are only assignable
/// in statement position on targets that manage lifetimes.
pub(crate) fn emit_assign_expr(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    op: AssignWhich,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    let target = child(ctx, store, id, 0)?;
    let value = store.children(id).get(1).copied();

    if store[target].which == Which::Operator(OperatorWhich::Index) {
        return emit_element_store(ctx, store, id, op, target, value);
    }
    if e.manages_lifetimes() && is_complex_node(store, target) {
        return Err(ctx.fail(
            no_target_equivalent(
                e.target().name(),
                "assigning a complex value inside an expression",
            )
            .with_node(id),
        ));
    }

    let target = Operand::new(
        emit_expr(ctx, store, target)?,
        type_checked(ctx, store, target)?,
    );
    let value = match value {
        Some(v) if op == AssignWhich::Equal => {
            Some(Operand::new(emit_expr(ctx, store, v)?, type_checked(ctx, store, v)?))
        }
        Some(v) => Some(typed_operand(ctx, store, v)?),
        None => None,
    };
    let text = e.assign(op, &target, value.as_ref());
    ctx.check(text, id)
}

/// `container[index] op= value`, lowered to a store of the combined value.
fn emit_element_store(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
    op: AssignWhich,
    target: NodeId,
    value: Option<NodeId>,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    let Some(value) = value else {
        return Err(ctx.fail(
            no_target_equivalent(e.target().name(), format!("`{}` on an element", op.symbol()))
                .with_node(id),
        ));
    };
    let (container, index) = (child(ctx, store, target, 0)?, child(ctx, store, target, 1)?);
    let container = emit_operand(ctx, store, container)?;
    let index = emit_expr(ctx, store, index)?;
    let element_ty = type_checked(ctx, store, target)?;

    let stored = if op == AssignWhich::Equal {
        Operand::new(emit_expr(ctx, store, value)?, type_checked(ctx, store, value)?)
    } else {
        let Some(binary) = op.operator() else {
            return Err(ctx.fail(adhoc_diagnostic::malformed_node(
                id,
                format!("`{}` has no binary form", op.symbol()),
            )));
        };
        let loaded = e.load_element(&container, &index, element_ty);
        let current = Operand::new(ctx.check(loaded, id)?, element_ty);
        let rhs = typed_operand(ctx, store, value)?;
        let combined = e.binary(binary, &current, &rhs, element_ty);
        Operand::new(ctx.check(combined, id)?, element_ty)
    };
    Ok(e.store_element(&container, &index, &stored))
}

// ── Calls ───────────────────────────────────────────────────────

fn emit_call(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    let mut args = Vec::new();
    for arg in store.children_with_role(id, Role::Argument) {
        args.push(Operand::new(emit_expr(ctx, store, arg)?, type_checked(ctx, store, arg)?));
    }

    let node = &store[id];
    if is_library_package(node.package.as_deref()) {
        let Some(def) = find_library_call(node.name_str()) else {
            return Err(ctx.fail(
                Diagnostic::error(ErrorCode::E4001)
                    .with_message(format!("unknown library call `{}`", node.name_str()))
                    .with_node(id),
            ));
        };
        let text = e.library_call(def, &args);
        return ctx.check(text, id);
    }
    Ok(e.call(&ctx.module, node.name_str(), &args))
}

// ── Function values ─────────────────────────────────────────────

/// An action defined in expression position, as a function value.
fn emit_function_value(
    ctx: &mut GenContext<'_>,
    store: &NodeStore,
    id: NodeId,
) -> Result<String, ErrorGuaranteed> {
    let e = ctx.emitter;
    if e.hoists_actions() {
        return Err(ctx.fail(
            no_target_equivalent(e.target().name(), "an action used as a value").with_node(id),
        ));
    }
    let sig = signature(ctx, store, id)?;
    let header = e.function_header(&ctx.module, &sig);
    let header = ctx.check(header, id)?;
    let footer = e.function_footer(&ctx.module, &sig);
    let body = render_body(ctx, store, id)?;
    let indent = "\t".repeat(ctx.out.level());
    Ok(format!("{header}\n{body}{indent}{footer}"))
}
