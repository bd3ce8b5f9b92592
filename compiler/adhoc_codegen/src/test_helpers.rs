//! Tree-building shorthands shared by the generator tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use adhoc_diagnostic::Diagnostic;
use adhoc_ir::{
    AssignWhich, ControlWhich, LiteralWhich, NodeId, NodeStore, OperatorWhich, Role, TreeBuilder,
    VariableWhich, Which,
};

use crate::{generate, CEmitter, GenOptions, JsEmitter};

pub(crate) const DECLARE: Which = Which::Variable(VariableWhich::Declare);
pub(crate) const EVAL: Which = Which::Variable(VariableWhich::Eval);
pub(crate) const RETURN: Which = Which::Control(ControlWhich::Return);
pub(crate) const CALL: Which = Which::Action(adhoc_ir::ActionWhich::Call);
pub(crate) const EQUAL: Which = Which::Assignment(AssignWhich::Equal);

pub(crate) fn lit(
    b: &mut TreeBuilder,
    parent: NodeId,
    kind: LiteralWhich,
    role: Role,
    value: &str,
) -> NodeId {
    b.valued(parent, Which::Literal(kind), role, value)
}

pub(crate) fn int(b: &mut TreeBuilder, parent: NodeId, role: Role, value: &str) -> NodeId {
    lit(b, parent, LiteralWhich::Int, role, value)
}

pub(crate) fn string(b: &mut TreeBuilder, parent: NodeId, role: Role, value: &str) -> NodeId {
    lit(b, parent, LiteralWhich::String, role, value)
}

pub(crate) fn eval(b: &mut TreeBuilder, parent: NodeId, role: Role, name: &str) -> NodeId {
    b.named(parent, EVAL, role, name)
}

/// Parameter `name` annotated with type `ty` (e.g. `"int"`).
pub(crate) fn param(b: &mut TreeBuilder, action: NodeId, name: &str, ty: &str) -> NodeId {
    b.push(Some(action), DECLARE, Role::Parameter, |n| {
        n.with_name(name).with_value(ty)
    })
}

/// `name = <value>` as a statement of `parent`; returns the assignment.
/// The value is built by the caller as a child with role `Expression`.
pub(crate) fn declare(b: &mut TreeBuilder, parent: NodeId, name: &str) -> NodeId {
    let eq = b.child(parent, EQUAL, Role::Statement);
    b.named(eq, DECLARE, Role::Storage, name);
    eq
}

pub(crate) fn assign(b: &mut TreeBuilder, parent: NodeId, op: AssignWhich, name: &str) -> NodeId {
    let node = b.child(parent, Which::Assignment(op), Role::Statement);
    b.named(node, EVAL, Role::Storage, name);
    node
}

pub(crate) fn op(b: &mut TreeBuilder, parent: NodeId, role: Role, op: OperatorWhich) -> NodeId {
    b.child(parent, Which::Operator(op), role)
}

pub(crate) fn library(b: &mut TreeBuilder, parent: NodeId, role: Role, name: &str) -> NodeId {
    b.push(Some(parent), CALL, role, |n| n.with_package("System").with_name(name))
}

pub(crate) fn call(b: &mut TreeBuilder, parent: NodeId, role: Role, name: &str) -> NodeId {
    b.named(parent, CALL, role, name)
}

pub(crate) fn ret(b: &mut TreeBuilder, parent: NodeId) -> NodeId {
    b.child(parent, RETURN, Role::Statement)
}

pub(crate) fn gen_c(store: &mut NodeStore, executable: bool) -> Result<String, Diagnostic> {
    let options = GenOptions {
        executable,
        module_name: None,
    };
    generate(store, &CEmitter::new(), &options)
}

pub(crate) fn gen_js(store: &mut NodeStore, executable: bool) -> Result<String, Diagnostic> {
    let options = GenOptions {
        executable,
        module_name: None,
    };
    generate(store, &JsEmitter::new(), &options)
}

/// `addOne(param: int) { return param + 1 }`
pub(crate) fn add_one() -> NodeStore {
    let mut b = TreeBuilder::new();
    let action = b.action(None, "addOne");
    param(&mut b, action, "param", "int");
    let r = ret(&mut b, action);
    let plus = op(&mut b, r, Role::Expression, OperatorWhich::Plus);
    eval(&mut b, plus, Role::Expression, "param");
    int(&mut b, plus, Role::Expression, "1");
    b.finish().unwrap()
}

/// Expected output: each line terminated by a newline.
pub(crate) fn lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// `run() { print("hi") }`
pub(crate) fn print_hi() -> NodeStore {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let print = library(&mut b, run, Role::Statement, "print");
    string(&mut b, print, Role::Argument, "hi");
    b.finish().unwrap()
}

/// `run() { a = [1, 2, 3] }`
pub(crate) fn int_array() -> NodeStore {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "a");
    let array = lit(&mut b, eq, LiteralWhich::Array, Role::Expression, "");
    for v in ["1", "2", "3"] {
        int(&mut b, array, Role::Member, v);
    }
    b.finish().unwrap()
}
