//! Per-kind type inference rules.
//!
//! Rules run bottom-up: the declare walk calls [`infer_node`] on a node after
//! its children have been declared, so operand types are already known.
//! Action definitions and calls need whole-program information and are typed
//! by the walk itself; [`ReturnTypes`] carries the return-type policy.

use adhoc_diagnostic::{malformed_node, unresolved_type, Diagnostic, ErrorCode};
use adhoc_ir::{
    AssignWhich, ControlWhich, DataType, LiteralWhich, NodeId, NodeStore, OperatorWhich, Role,
    VariableWhich, Which,
};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::lattice::{element_type, resolve};

/// Type fixed by a literal's kind.
pub fn literal_type(which: LiteralWhich) -> DataType {
    match which {
        LiteralWhich::Bool => DataType::Bool,
        LiteralWhich::Int => DataType::Int,
        LiteralWhich::Float => DataType::Float,
        LiteralWhich::String => DataType::String,
        LiteralWhich::Array => DataType::Array,
        LiteralWhich::Hash => DataType::Hash,
        LiteralWhich::Struct => DataType::Struct,
    }
}

/// Resolved type of `id`, or an unresolved-type error naming it.
pub fn type_of(store: &NodeStore, id: NodeId) -> Result<DataType, Diagnostic> {
    let node = &store[id];
    node.resolved_type
        .ok_or_else(|| unresolved_type(id, &node.label()))
}

/// Apply the rule for `id`'s kind. Actions and calls are left untouched.
pub fn infer_node(store: &mut NodeStore, id: NodeId) -> Result<(), Diagnostic> {
    match store[id].which {
        Which::Literal(lit) => infer_literal(store, id, lit),
        Which::Variable(var) => {
            infer_variable(store, id, var);
            Ok(())
        }
        Which::Operator(op) => infer_operator(store, id, op),
        Which::Assignment(assign) => infer_assignment(store, id, assign),
        Which::Control(ControlWhich::Return) => infer_return(store, id),
        _ => Ok(()),
    }
}

fn infer_literal(store: &mut NodeStore, id: NodeId, lit: LiteralWhich) -> Result<(), Diagnostic> {
    let ty = literal_type(lit);
    let elements = if ty.is_container() {
        let types: SmallVec<[DataType; 8]> = store
            .children(id)
            .iter()
            .map(|&child| type_of(store, child))
            .collect::<Result<_, _>>()?;
        Some(element_type(types))
    } else {
        None
    };
    let node = &mut store[id];
    node.resolved_type = Some(ty);
    node.element_type = elements;
    Ok(())
}

fn infer_variable(store: &mut NodeStore, id: NodeId, var: VariableWhich) {
    let node = &store[id];
    let inherited = node.reference.map(|decl| {
        let decl = &store[decl];
        (decl.resolved_type, decl.element_type)
    });
    let (ty, elements) = match (var, inherited) {
        (_, Some(found)) => found,
        (VariableWhich::Declare, None) if node.role == Role::Parameter => {
            (parameter_type(store, id), None)
        }
        // A fresh declaration is typed by the assignment that binds it.
        _ => return,
    };
    let node = &mut store[id];
    node.resolved_type = node.resolved_type.or(ty);
    node.element_type = node.element_type.or(elements);
}

/// A parameter's type: an explicit annotation in its value text, else the
/// kind of a literal default given as its first child, else Mixed.
fn parameter_type(store: &NodeStore, id: NodeId) -> Option<DataType> {
    let node = &store[id];
    if let Ok(ty) = node.value_str().parse::<DataType>() {
        return Some(ty);
    }
    let defaulted = node.children().first().and_then(|&child| match store[child].which {
        Which::Literal(lit) => Some(literal_type(lit)),
        _ => None,
    });
    Some(defaulted.unwrap_or(DataType::Mixed))
}

fn operand(store: &NodeStore, id: NodeId, position: usize) -> Result<NodeId, Diagnostic> {
    store.children(id).get(position).copied().ok_or_else(|| {
        malformed_node(
            id,
            format!("`{}` is missing operand {}", store[id].which, position + 1),
        )
    })
}

fn infer_operator(store: &mut NodeStore, id: NodeId, op: OperatorWhich) -> Result<(), Diagnostic> {
    let (ty, elements) = match op {
        OperatorWhich::Not => {
            type_of(store, operand(store, id, 0)?)?;
            (DataType::Bool, None)
        }
        OperatorWhich::Ternary => {
            type_of(store, operand(store, id, 0)?)?;
            let then = operand(store, id, 1)?;
            let other = operand(store, id, 2)?;
            let ty = resolve(type_of(store, then)?, type_of(store, other)?);
            let elements = match (store[then].element_type, store[other].element_type) {
                (Some(a), Some(b)) => Some(element_type([a, b])),
                _ => None,
            };
            (ty, elements)
        }
        OperatorWhich::Index => {
            let container = operand(store, id, 0)?;
            type_of(store, operand(store, id, 1)?)?;
            let container_ty = type_of(store, container)?;
            let ty = match (container_ty, store[container].element_type) {
                (DataType::String, _) => DataType::String,
                (ty, Some(elements)) if ty.is_container() && elements != DataType::Void => elements,
                (ty, _) if ty.is_container() => DataType::Mixed,
                _ => DataType::Void,
            };
            (ty, None)
        }
        _ => {
            let lhs = type_of(store, operand(store, id, 0)?)?;
            let rhs = type_of(store, operand(store, id, 1)?)?;
            if op.is_comparison() || op.is_logical() {
                (DataType::Bool, None)
            } else {
                (resolve(lhs, rhs), None)
            }
        }
    };
    let node = &mut store[id];
    node.resolved_type = Some(ty);
    node.element_type = elements;
    Ok(())
}

fn infer_assignment(
    store: &mut NodeStore,
    id: NodeId,
    assign: AssignWhich,
) -> Result<(), Diagnostic> {
    let target = operand(store, id, 0)?;

    if assign.is_unary() {
        let ty = if assign.is_boolean() {
            store[target].resolved_type = Some(DataType::Bool);
            DataType::Bool
        } else {
            type_of(store, target)?
        };
        store[id].resolved_type = Some(ty);
        return Ok(());
    }

    let value = operand(store, id, 1)?;
    let value_ty = type_of(store, value)?;
    let value_elements = store[value].element_type;

    let ty = if assign.is_boolean() {
        store[target].resolved_type = Some(DataType::Bool);
        DataType::Bool
    } else {
        let target_node = &mut store[target];
        let target_ty = *target_node.resolved_type.get_or_insert(value_ty);
        if target_node.element_type.is_none() {
            target_node.element_type = value_elements;
        }
        match assign {
            AssignWhich::Equal => value_ty,
            _ => resolve(target_ty, value_ty),
        }
    };
    let node = &mut store[id];
    node.resolved_type = Some(ty);
    node.element_type = value_elements;
    Ok(())
}

fn infer_return(store: &mut NodeStore, id: NodeId) -> Result<(), Diagnostic> {
    let (ty, elements) = match store.children(id).first() {
        Some(&value) => (type_of(store, value)?, store[value].element_type),
        None => (DataType::Void, None),
    };
    let node = &mut store[id];
    node.resolved_type = Some(ty);
    node.element_type = elements;
    Ok(())
}

/// Return types collected for one action definition.
///
/// Valued returns widen with [`resolve`]. An action that mixes valued and
/// valueless returns, or whose valued returns poison the lattice, is an
/// error rather than silently taking one of them.
#[derive(Clone, Debug, Default)]
pub struct ReturnTypes {
    valued: SmallVec<[(NodeId, DataType); 4]>,
    valueless: SmallVec<[NodeId; 2]>,
}

impl ReturnTypes {
    pub fn record(&mut self, ret: NodeId, has_value: bool, ty: DataType) {
        if has_value {
            self.valued.push((ret, ty));
        } else {
            self.valueless.push(ret);
        }
    }

    /// Widened type of the returns seen so far. Used to type recursive calls
    /// made before the action has been fully declared.
    pub fn provisional(&self) -> DataType {
        let mut iter = self.valued.iter().map(|&(_, ty)| ty);
        let first = iter.next().unwrap_or(DataType::Void);
        iter.fold(first, resolve)
    }

    /// Final type of the action.
    pub fn finish(&self, action: NodeId) -> Result<DataType, Diagnostic> {
        let Some(&(first_ret, _)) = self.valued.first() else {
            return Ok(DataType::Void);
        };
        if let Some(&bare) = self.valueless.first() {
            debug!(%action, %bare, %first_ret, "valued and valueless returns mixed");
            return Err(Diagnostic::error(ErrorCode::E2002)
                .with_message("action returns a value on some paths and nothing on others")
                .with_node(bare)
                .with_note(format!("a value is returned at node {first_ret}")));
        }
        let widened = self.provisional();
        if widened == DataType::Void && self.valued.iter().any(|&(_, ty)| ty != DataType::Void) {
            let found: Vec<&str> = self.valued.iter().map(|(_, ty)| ty.name()).collect();
            debug!(%action, found = ?found, "return types do not widen");
            return Err(Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "return types do not agree: {}",
                    found.join(", ")
                ))
                .with_node(action));
        }
        if self.valued.iter().any(|&(_, ty)| ty != widened) {
            trace!(%action, %widened, returns = self.valued.len(), "return types widened");
        }
        Ok(widened)
    }
}
