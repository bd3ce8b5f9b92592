#![allow(clippy::unwrap_used, clippy::expect_used)]

use adhoc_ir::builtins::find_library_call;
use adhoc_ir::{
    ActionWhich, AssignWhich, ControlWhich, LiteralWhich, OperatorWhich, Role, TreeBuilder, Which,
};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::*;

fn operand(text: &str, ty: DataType) -> Operand {
    Operand::new(text, ty)
}

// ── Whole modules ───────────────────────────────────────────────

#[test]
fn test_add_one() {
    let mut store = add_one();
    assert_eq!(
        gen_c(&mut store, false).unwrap(),
        lines(&[
            "#include \"libadhoc.h\"",
            "",
            "int addOne(int param);",
            "",
            "int addOne(int param){",
            "\treturn param + 1;",
            "}",
        ])
    );
}

#[test]
fn test_literal_temp_created_and_released_once() {
    let mut store = print_hi();
    let out = gen_c(&mut store, false).unwrap();
    assert_eq!(
        out,
        lines(&[
            "#include \"libadhoc.h\"",
            "",
            "void run(void);",
            "",
            "void run(void){",
            "\tadhoc_data* _tmp3 = adhoc_createString(\"hi\");",
            "\tadhoc_print(\"s\", _tmp3);",
            "\tadhoc_release(_tmp3);",
            "}",
        ])
    );
    assert_eq!(out.matches("adhoc_createString").count(), 1);
    assert_eq!(out.matches("adhoc_release(_tmp3)").count(), 1);
}

#[test]
fn test_array_literal_stores_in_index_order() {
    let mut store = int_array();
    let out = gen_c(&mut store, false).unwrap();
    assert_eq!(
        out,
        lines(&[
            "#include \"libadhoc.h\"",
            "",
            "void run(void);",
            "",
            "void run(void){",
            "\tadhoc_data* a = adhoc_createArray(ADHOC_INT, 3);",
            "\tadhoc_storeElement(a, 0, NULL, 1);",
            "\tadhoc_storeElement(a, 1, NULL, 2);",
            "\tadhoc_storeElement(a, 2, NULL, 3);",
            "\tadhoc_release(a);",
            "}",
        ])
    );
}

#[test]
fn test_executable_with_complex_root_releases_result() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let r = ret(&mut b, run);
    string(&mut b, r, Role::Expression, "s");
    let mut store = b.finish().unwrap();

    assert_eq!(
        gen_c(&mut store, true).unwrap(),
        lines(&[
            "#include \"libadhoc.h\"",
            "",
            "adhoc_data* run(void);",
            "",
            "adhoc_data* run(void){",
            "\tadhoc_data* _tmp3 = adhoc_createString(\"s\");",
            "\treturn _tmp3;",
            "}",
            "",
            "int main(void){",
            "\tadhoc_release(run());",
            "\treturn 0;",
            "}",
        ])
    );
}

#[test]
fn test_executable_simple_root_is_called_plainly() {
    let mut store = print_hi();
    let out = gen_c(&mut store, true).unwrap();
    assert!(out.ends_with("int main(void){\n\trun();\n\treturn 0;\n}\n"), "{out}");
}

#[test]
fn test_executable_root_with_params_rejected() {
    let mut store = add_one();
    let err = gen_c(&mut store, true).unwrap_err();
    assert_eq!(err.code, ErrorCode::E5001);
}

#[test]
fn test_executable_root_named_main_rejected() {
    let mut b = TreeBuilder::new();
    b.action(None, "main");
    let mut store = b.finish().unwrap();
    let err = gen_c(&mut store, true).unwrap_err();
    assert_eq!(err.code, ErrorCode::E5001);

    let mut b = TreeBuilder::new();
    b.action(None, "main");
    let mut store = b.finish().unwrap();
    assert!(gen_c(&mut store, false).is_ok());
}

#[test]
fn test_nested_actions_are_hoisted() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    call(&mut b, run, Role::Statement, "helper");
    let helper = b.action(Some(run), "helper");
    let print = library(&mut b, helper, Role::Statement, "print");
    string(&mut b, print, Role::Argument, "h");
    let mut store = b.finish().unwrap();

    assert_eq!(
        gen_c(&mut store, false).unwrap(),
        lines(&[
            "#include \"libadhoc.h\"",
            "",
            "void run(void);",
            "void helper(void);",
            "",
            "void run(void){",
            "\thelper();",
            "}",
            "",
            "void helper(void){",
            "\tadhoc_data* _tmp5 = adhoc_createString(\"h\");",
            "\tadhoc_print(\"s\", _tmp5);",
            "\tadhoc_release(_tmp5);",
            "}",
        ])
    );
}

#[test]
fn test_action_comment_from_value() {
    let mut b = TreeBuilder::new();
    b.push(None, Which::Action(ActionWhich::Definition), Role::None, |n| {
        n.with_name("run").with_value("entry point")
    });
    let mut store = b.finish().unwrap();
    let out = gen_c(&mut store, false).unwrap();
    assert!(out.contains("\n// entry point\nvoid run(void){\n"), "{out}");
}

// ── Lifetimes ───────────────────────────────────────────────────

#[test]
fn test_complex_parameter_retained_and_released() {
    let mut b = TreeBuilder::new();
    let greet = b.action(None, "greet");
    param(&mut b, greet, "name", "string");
    let print = library(&mut b, greet, Role::Statement, "print");
    eval(&mut b, print, Role::Argument, "name");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "void greet(adhoc_data* name){",
            "\tadhoc_retain(name);",
            "\tadhoc_print(\"s\", name);",
            "\tadhoc_release(name);",
            "}",
        ])),
        "{out}"
    );
}

#[test]
fn test_reassignment_swaps_and_releases_old_value() {
    // run() { s = "a"; s = concat(s, "b") }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "s");
    string(&mut b, eq, Role::Expression, "a");
    let eq2 = assign(&mut b, run, AssignWhich::Equal, "s");
    let concat = library(&mut b, eq2, Role::Expression, "concat");
    eval(&mut b, concat, Role::Argument, "s");
    string(&mut b, concat, Role::Argument, "b");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "void run(void){",
            "\tadhoc_data* s = adhoc_createString(\"a\");",
            "\tadhoc_data* _tmp9 = adhoc_createString(\"b\");",
            "\t{",
            "\t\tadhoc_data* _old5 = s;",
            "\t\ts = adhoc_concat(\"ss\", s, _tmp9);",
            "\t\tadhoc_release(_old5);",
            "\t}",
            "\tadhoc_release(s);",
            "\tadhoc_release(_tmp9);",
            "}",
        ])),
        "{out}"
    );
}

#[test]
fn test_borrowed_assignment_is_retained() {
    // run() { s = "a"; t = "b"; s = t }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "s");
    string(&mut b, eq, Role::Expression, "a");
    let eq = declare(&mut b, run, "t");
    string(&mut b, eq, Role::Expression, "b");
    let eq = assign(&mut b, run, AssignWhich::Equal, "s");
    eval(&mut b, eq, Role::Expression, "t");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(out.contains("\t\ts = adhoc_retain(t);\n"), "{out}");
}

#[test]
fn test_string_append_assignment_concatenates() {
    // run() { s = "a"; s += 1 }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "s");
    string(&mut b, eq, Role::Expression, "a");
    let plus = assign(&mut b, run, AssignWhich::Plus, "s");
    int(&mut b, plus, Role::Expression, "1");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(out.contains("\t\ts = adhoc_concat(\"si\", s, 1);\n"), "{out}");
}

#[test]
fn test_discarded_complex_call_is_released() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let concat = library(&mut b, run, Role::Statement, "concat");
    int(&mut b, concat, Role::Argument, "1");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(out.contains("\tadhoc_release(adhoc_concat(\"i\", 1));\n"), "{out}");
}

#[test]
fn test_nested_complex_call_uses_result_temp() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let print = library(&mut b, run, Role::Statement, "print");
    let concat = library(&mut b, print, Role::Argument, "concat");
    int(&mut b, concat, Role::Argument, "1");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "void run(void){",
            "\tadhoc_data* _res3 = NULL;",
            "\tadhoc_print(\"s\", (adhoc_release(_res3), _res3 = adhoc_concat(\"i\", 1)));",
            "\tadhoc_release(_res3);",
            "}",
        ])),
        "{out}"
    );
}

#[test]
fn test_computed_complex_return_uses_return_temp() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let r = ret(&mut b, run);
    let concat = library(&mut b, r, Role::Expression, "concat");
    int(&mut b, concat, Role::Argument, "1");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "adhoc_data* run(void){",
            "\tadhoc_data* _ret2 = NULL;",
            "\t_ret2 = adhoc_concat(\"i\", 1);",
            "\treturn _ret2;",
            "}",
        ])),
        "{out}"
    );
}

#[test]
fn test_simple_return_evaluated_before_releases() {
    // run() { s = "a"; n = 2; return n + 1 }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "s");
    string(&mut b, eq, Role::Expression, "a");
    let eq = declare(&mut b, run, "n");
    int(&mut b, eq, Role::Expression, "2");
    let r = ret(&mut b, run);
    let plus = op(&mut b, r, Role::Expression, OperatorWhich::Plus);
    eval(&mut b, plus, Role::Expression, "n");
    int(&mut b, plus, Role::Expression, "1");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "int run(void){",
            "\tadhoc_data* s = adhoc_createString(\"a\");",
            "\tint n;",
            "\tn = 2;",
            "\t{",
            "\t\tint _ret8 = n + 1;",
            "\t\tadhoc_release(s);",
            "\t\treturn _ret8;",
            "\t}",
            "}",
        ])),
        "{out}"
    );
}

#[test]
fn test_returned_variable_is_moved_not_released() {
    // run() { s = "a"; t = "b"; return s }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "s");
    string(&mut b, eq, Role::Expression, "a");
    let eq = declare(&mut b, run, "t");
    string(&mut b, eq, Role::Expression, "b");
    let r = ret(&mut b, run);
    eval(&mut b, r, Role::Expression, "s");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(out.ends_with("\tadhoc_release(t);\n\treturn s;\n}\n"), "{out}");
    assert!(!out.contains("adhoc_release(s)"), "{out}");
}

#[test]
fn test_loop_scope_released_after_loop() {
    // run() { for(; true; ){ print("x"); break } }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let lp = b.child(run, Which::Control(ControlWhich::Loop), Role::Statement);
    lit(&mut b, lp, LiteralWhich::Bool, Role::Condition, "true");
    let print = library(&mut b, lp, Role::Statement, "print");
    string(&mut b, print, Role::Argument, "x");
    b.child(lp, Which::Control(ControlWhich::Break), Role::Statement);
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "void run(void){",
            "\tadhoc_data* _tmp5 = adhoc_createString(\"x\");",
            "\tfor(; true; ){",
            "\t\tadhoc_print(\"s\", _tmp5);",
            "\t\tbreak;",
            "\t}",
            "\tadhoc_release(_tmp5);",
            "}",
        ])),
        "{out}"
    );
}

#[test]
fn test_break_releases_inner_scopes() {
    // run() { for(; true; ){ if(true){ print("y"); break } } }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let lp = b.child(run, Which::Control(ControlWhich::Loop), Role::Statement);
    lit(&mut b, lp, LiteralWhich::Bool, Role::Condition, "true");
    let iff = b.child(lp, Which::Control(ControlWhich::If), Role::Statement);
    lit(&mut b, iff, LiteralWhich::Bool, Role::Condition, "1");
    let print = library(&mut b, iff, Role::If, "print");
    string(&mut b, print, Role::Argument, "y");
    b.child(iff, Which::Control(ControlWhich::Break), Role::If);
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(
        out.ends_with(&lines(&[
            "void run(void){",
            "\tfor(; true; ){",
            "\t\tadhoc_data* _tmp7 = adhoc_createString(\"y\");",
            "\t\tif(true){",
            "\t\t\tadhoc_print(\"s\", _tmp7);",
            "\t\t\tadhoc_release(_tmp7);",
            "\t\t\tbreak;",
            "\t\t}",
            "\t\tadhoc_release(_tmp7);",
            "\t}",
            "}",
        ])),
        "{out}"
    );
}

// ── Expressions ─────────────────────────────────────────────────

#[test]
fn test_exponent_and_grouping() {
    // return (n + 1) ^ 2
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    param(&mut b, run, "n", "int");
    let r = ret(&mut b, run);
    let pow = op(&mut b, r, Role::Expression, OperatorWhich::Exponent);
    let plus = op(&mut b, pow, Role::Expression, OperatorWhich::Plus);
    eval(&mut b, plus, Role::Expression, "n");
    int(&mut b, plus, Role::Expression, "1");
    int(&mut b, pow, Role::Expression, "2");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(out.contains("\treturn pow((n + 1), 2);\n"), "{out}");
}

#[test]
fn test_element_load_is_cast() {
    // run() { a = [1]; n = a[0] }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "a");
    let array = lit(&mut b, eq, LiteralWhich::Array, Role::Expression, "");
    int(&mut b, array, Role::Member, "1");
    let eq = declare(&mut b, run, "n");
    let index = op(&mut b, eq, Role::Expression, OperatorWhich::Index);
    eval(&mut b, index, Role::Expression, "a");
    int(&mut b, index, Role::Index, "0");
    let mut store = b.finish().unwrap();

    let out = gen_c(&mut store, false).unwrap();
    assert!(out.contains("\tn = ((int)adhoc_getElementS(a, 0));\n"), "{out}");
}

#[test]
fn test_invalid_int_literal() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let r = ret(&mut b, run);
    let bad = int(&mut b, r, Role::Expression, "12x");
    let mut store = b.finish().unwrap();

    let err = gen_c(&mut store, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::E1002);
    assert_eq!(err.node, Some(bad));
}

// ── Unsupported constructs ──────────────────────────────────────

#[test]
fn test_hash_literal_unsupported() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "h");
    let hash = lit(&mut b, eq, LiteralWhich::Hash, Role::Expression, "");
    b.push(Some(hash), Which::Literal(LiteralWhich::Int), Role::Member, |n| {
        n.with_name("x").with_value("1")
    });
    let mut store = b.finish().unwrap();

    let err = gen_c(&mut store, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::E3001);
}

#[test]
fn test_switch_unsupported() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let switch = b.child(run, Which::Control(ControlWhich::Switch), Role::Statement);
    let mut store = b.finish().unwrap();

    let err = gen_c(&mut store, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::E3001);
    assert_eq!(err.node, Some(switch));
}

#[test]
fn test_closure_read_has_no_c_equivalent() {
    // run() { x = 1; inner() { return x } }
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "x");
    int(&mut b, eq, Role::Expression, "1");
    let inner = b.action(Some(run), "inner");
    let r = ret(&mut b, inner);
    let x = eval(&mut b, r, Role::Expression, "x");
    let mut store = b.finish().unwrap();

    let err = gen_c(&mut store, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::E5001);
    assert_eq!(err.node, Some(x));
}

#[test]
fn test_action_value_has_no_c_equivalent() {
    let mut b = TreeBuilder::new();
    let run = b.action(None, "run");
    let eq = declare(&mut b, run, "f");
    b.child(eq, Which::Action(ActionWhich::Definition), Role::Expression);
    let mut store = b.finish().unwrap();

    let err = gen_c(&mut store, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::E5001);
}

#[test]
fn test_root_must_be_action() {
    let mut b = TreeBuilder::new();
    b.push(None, Which::Group, Role::None, |n| n);
    let mut store = b.finish().unwrap();

    let err = gen_c(&mut store, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::E1002);
}

// ── Templates ───────────────────────────────────────────────────

#[test]
fn test_type_names() {
    let c = CEmitter::new();
    assert_eq!(c.type_name(DataType::Float).unwrap(), "float");
    assert_eq!(c.type_name(DataType::Hash).unwrap(), "adhoc_data*");
    assert_eq!(c.type_name(DataType::Mixed).unwrap_err().code, ErrorCode::E5001);
    assert_eq!(c.local(DataType::Void, "x", None).unwrap_err().code, ErrorCode::E5001);
}

#[test]
fn test_store_element_by_class() {
    let c = CEmitter::new();
    assert_eq!(
        c.store_element("a", "0", &operand("1", DataType::Int)),
        "adhoc_storeElement(a, 0, NULL, 1)"
    );
    assert_eq!(
        c.store_element("a", "1", &operand("s", DataType::String)),
        "adhoc_storeElement(a, 1, s, 0)"
    );
}

#[test]
fn test_library_calls() {
    let c = CEmitter::new();
    let print = find_library_call("print").unwrap();
    assert_eq!(
        c.library_call(
            print,
            &[operand("s", DataType::String), operand("2", DataType::Int)]
        )
        .unwrap(),
        "adhoc_print(\"si\", s, 2)"
    );
    let substring = find_library_call("substring").unwrap();
    assert_eq!(
        c.library_call(
            substring,
            &[
                operand("s", DataType::String),
                operand("0", DataType::Int),
                operand("2", DataType::Int)
            ]
        )
        .unwrap(),
        "adhoc_substring(s, 0, 2)"
    );
}

#[test]
fn test_complex_comparison_has_no_c_equivalent() {
    let c = CEmitter::new();
    let err = c
        .binary(
            OperatorWhich::Equal,
            &operand("a", DataType::String),
            &operand("b", DataType::String),
            DataType::Bool,
        )
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::E5001);
}
