use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_builder_and_display() {
    let diag = Diagnostic::error(ErrorCode::E4002)
        .with_message("`substring` expects exactly 3 arguments, found 2")
        .with_node(NodeId::new(17))
        .with_note("library calls are checked before lowering");
    assert_eq!(
        diag.to_string(),
        "error[E4002]: `substring` expects exactly 3 arguments, found 2\n  --> node #17\n  = note: library calls are checked before lowering"
    );
    assert_eq!(diag.kind(), ErrorKind::LibraryCall);
    assert!(diag.is_error());
}

#[test]
fn test_or_node_keeps_specific_node() {
    let tagged = malformed_node(NodeId::new(3), "loop without body").or_node(NodeId::new(1));
    assert_eq!(tagged.node, Some(NodeId::new(3)));
    let untagged = no_target_equivalent("C", "a closure").or_node(NodeId::new(1));
    assert_eq!(untagged.node, Some(NodeId::new(1)));
}

#[test]
fn test_warning_severity() {
    let diag = Diagnostic::warning(ErrorCode::E2001).with_message("unresolved call");
    assert!(!diag.is_error());
    assert_eq!(diag.to_string(), "warning[E2001]: unresolved call");
}

#[test]
fn test_unresolved_type_names_node() {
    let diag = unresolved_type(NodeId::new(9), "variable.eval x");
    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.node, Some(NodeId::new(9)));
    assert!(diag.message.contains("variable.eval x"));
}
