#![allow(clippy::unwrap_used, clippy::expect_used)]

use adhoc_ir::{AssignWhich, DataType, LiteralWhich, OperatorWhich, TreeBuilder};
use adhoc_scope::{assign_scope, enclosing_scope, register};
use pretty_assertions::assert_eq;

use super::*;
use crate::temps::TempKind;

const DECLARE: Which = Which::Variable(VariableWhich::Declare);
const EVAL: Which = Which::Variable(VariableWhich::Eval);
const STRING: Which = Which::Literal(LiteralWhich::String);
const RETURN: Which = Which::Control(ControlWhich::Return);

/// Scope every node and give declarations and literals their types.
fn annotate(store: &mut NodeStore) {
    for (id, _) in store.preorder() {
        if let Some(scope) = enclosing_scope(store, id) {
            assign_scope(store, id, scope);
        }
        let node = &mut store[id];
        match node.which {
            Which::Literal(LiteralWhich::String) => {
                node.resolved_type = Some(DataType::String);
                if node.registered {
                    node.temp_name = Some(TempKind::Literal.name_for(id));
                }
            }
            Which::Literal(LiteralWhich::Int) => node.resolved_type = Some(DataType::Int),
            _ => {}
        }
    }
    // Declarations and uses take the type of what is assigned to them.
    for (id, _) in store.preorder() {
        if store[id].which == Which::Assignment(AssignWhich::Equal) {
            let &[target, value] = store.children(id) else {
                continue;
            };
            let ty = store[value].resolved_type;
            store[target].resolved_type = ty;
        }
        if store[id].which == EVAL {
            let ty = store[id].reference.and_then(|d| store[d].resolved_type);
            store[id].resolved_type = ty;
        }
    }
}

fn string_decl(b: &mut TreeBuilder, parent: NodeId, name: &str) -> NodeId {
    let eq = b.child(parent, Which::Assignment(AssignWhich::Equal), Role::Statement);
    let target = b.named(eq, DECLARE, Role::Storage, name);
    b.valued(eq, STRING, Role::Expression, name);
    target
}

fn int_decl(b: &mut TreeBuilder, parent: NodeId, name: &str) -> NodeId {
    let eq = b.child(parent, Which::Assignment(AssignWhich::Equal), Role::Statement);
    let target = b.named(eq, DECLARE, Role::Storage, name);
    b.valued(eq, Which::Literal(LiteralWhich::Int), Role::Expression, "1");
    target
}

// ── Fallthrough ─────────────────────────────────────────────────

#[test]
fn test_fallthrough_releases_complex_only_in_order() {
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let s = string_decl(&mut b, main, "s");
    int_decl(&mut b, main, "n");
    let t = string_decl(&mut b, main, "t");
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(fallthrough_releases(&store, main).as_slice(), &[s, t]);
}

#[test]
fn test_unbound_literal_temp_is_released() {
    // main { print("hi") }
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let call = b.named(main, Which::Action(ActionWhich::Call), Role::Statement, "print");
    let lit = b.valued(call, STRING, Role::Argument, "hi");
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(fallthrough_releases(&store, main).as_slice(), &[lit]);
}

// ── Return ──────────────────────────────────────────────────────

#[test]
fn test_return_moves_named_value_and_releases_rest() {
    // main { s = "s"; t = "t"; if { u = "u"; return t } }
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let s = string_decl(&mut b, main, "s");
    string_decl(&mut b, main, "t");
    let iff = b.child(main, Which::Control(ControlWhich::If), Role::Statement);
    let u = string_decl(&mut b, iff, "u");
    let ret = b.child(iff, RETURN, Role::If);
    b.named(ret, EVAL, Role::Expression, "t");
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    let moved = moved_value(&store, ret).unwrap();
    assert_eq!(store[moved].name_str(), "t");
    assert_eq!(return_releases(&store, ret).as_slice(), &[u, s]);
}

#[test]
fn test_return_of_literal_moves_its_temp() {
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let s = string_decl(&mut b, main, "s");
    let ret = b.child(main, RETURN, Role::Statement);
    let lit = b.valued(ret, STRING, Role::Expression, "out");
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(moved_value(&store, ret), Some(lit));
    assert_eq!(return_releases(&store, ret).as_slice(), &[s]);
}

#[test]
fn test_return_temp_is_the_moved_value() {
    // main { s = "s"; return s + "x" }
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let s = string_decl(&mut b, main, "s");
    let ret = b.child(main, RETURN, Role::Statement);
    let plus = b.child(ret, Which::Operator(OperatorWhich::Plus), Role::Expression);
    b.named(plus, EVAL, Role::Expression, "s");
    let lit = b.valued(plus, STRING, Role::Expression, "x");
    let mut store = b.finish().unwrap();
    annotate(&mut store);
    store[plus].resolved_type = Some(DataType::String);
    store[ret].resolved_type = Some(DataType::String);
    store[ret].temp_name = Some(TempKind::Return.name_for(ret));
    register(&mut store, main, ret);

    assert_eq!(moved_value(&store, ret), Some(ret));
    assert_eq!(return_releases(&store, ret).as_slice(), &[s, lit]);
}

#[test]
fn test_simple_return_moves_nothing() {
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let s = string_decl(&mut b, main, "s");
    let ret = b.child(main, RETURN, Role::Statement);
    b.valued(ret, Which::Literal(LiteralWhich::Int), Role::Expression, "0");
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(moved_value(&store, ret), None);
    assert_eq!(return_releases(&store, ret).as_slice(), &[s]);
}

#[test]
fn test_return_stops_at_owning_action() {
    // outer { s = "s"; inner { t = "t"; return } }
    let mut b = TreeBuilder::new();
    let outer = b.action(None, "outer");
    string_decl(&mut b, outer, "s");
    let inner = b.action(Some(outer), "inner");
    let t = string_decl(&mut b, inner, "t");
    let ret = b.child(inner, RETURN, Role::Statement);
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(return_releases(&store, ret).as_slice(), &[t]);
}

// ── Jumps ───────────────────────────────────────────────────────

#[test]
fn test_break_releases_scopes_inside_loop_only() {
    // main { loop { a = "a"; if { b = "b"; break } } }
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let lp = b.child(main, Which::Control(ControlWhich::Loop), Role::Statement);
    string_decl(&mut b, lp, "a");
    let iff = b.child(lp, Which::Control(ControlWhich::If), Role::Statement);
    let inner = string_decl(&mut b, iff, "b");
    let brk = b.child(iff, Which::Control(ControlWhich::Break), Role::If);
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(jump_releases(&store, brk).unwrap().as_slice(), &[inner]);
}

#[test]
fn test_continue_directly_in_loop_releases_nothing() {
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let lp = b.child(main, Which::Control(ControlWhich::Loop), Role::Statement);
    string_decl(&mut b, lp, "a");
    let cont = b.child(lp, Which::Control(ControlWhich::Continue), Role::Statement);
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(jump_releases(&store, cont), Some(ReleasePlan::new()));
}

#[test]
fn test_jump_outside_loop_has_no_plan() {
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let iff = b.child(main, Which::Control(ControlWhich::If), Role::Statement);
    let brk = b.child(iff, Which::Control(ControlWhich::Break), Role::If);
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(jump_releases(&store, brk), None);
}

#[test]
fn test_jump_does_not_cross_action_boundary() {
    // main { loop { helper { break } } }
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let lp = b.child(main, Which::Control(ControlWhich::Loop), Role::Statement);
    let helper = b.action(Some(lp), "helper");
    let brk = b.child(helper, Which::Control(ControlWhich::Break), Role::Statement);
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    assert_eq!(jump_releases(&store, brk), None);
}

// ── Parameters ──────────────────────────────────────────────────

#[test]
fn test_only_complex_parameters_are_retained() {
    let mut b = TreeBuilder::new();
    let main = b.action(None, "greet");
    let name = b.named(main, DECLARE, Role::Parameter, "name");
    let times = b.named(main, DECLARE, Role::Parameter, "times");
    let mut store = b.finish().unwrap();
    annotate(&mut store);
    store[name].resolved_type = Some(DataType::String);
    store[times].resolved_type = Some(DataType::Int);

    assert_eq!(parameter_retains(&store, main).as_slice(), &[name]);
}

// ── Exactly once ────────────────────────────────────────────────

#[test]
fn test_each_complex_var_released_once_per_path() {
    // main { s = "s"; t = "t"; if { return s } }  plus fallthrough
    let mut b = TreeBuilder::new();
    let main = b.action(None, "main");
    let s = string_decl(&mut b, main, "s");
    let t = string_decl(&mut b, main, "t");
    let iff = b.child(main, Which::Control(ControlWhich::If), Role::Statement);
    let ret = b.child(iff, RETURN, Role::If);
    b.named(ret, EVAL, Role::Expression, "s");
    let mut store = b.finish().unwrap();
    annotate(&mut store);

    let on_return = return_releases(&store, ret);
    let on_fallthrough = fallthrough_releases(&store, main);
    for var in [s, t] {
        let expected_on_return = usize::from(var != s);
        assert_eq!(on_return.iter().filter(|&&v| v == var).count(), expected_on_return);
        assert_eq!(on_fallthrough.iter().filter(|&&v| v == var).count(), 1);
    }
}
