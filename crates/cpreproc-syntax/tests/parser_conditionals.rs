mod common;
use common::*;

// Conditional blocks
#[test]
fn test_ifdef_else() {
    insta::assert_snapshot!(
        sexp("#ifdef A\nx\n#else\ny\n#endif\n"),
        @"(translation_unit (preproc_ifdef name: (identifier) body: (block_items (c_tokens token: (identifier))) alternative: (preproc_else body: (block_items (c_tokens token: (identifier))))))"
    );
}

#[test]
fn test_if_elif_else_chain() {
    insta::assert_snapshot!(
        sexp("#if A\na\n#elif B\nb\n#else\nc\n#endif\n"),
        @"(translation_unit (preproc_if condition: (identifier) body: (block_items (c_tokens token: (identifier))) alternative: (preproc_elif condition: (identifier) body: (block_items (c_tokens token: (identifier))) alternative: (preproc_else body: (block_items (c_tokens token: (identifier)))))))"
    );
}

#[test]
fn test_include_guard() {
    let tree = parse("#ifndef H\n#define H\n#endif\n");
    assert_eq!(
        tree.root_node().to_sexp(),
        "(translation_unit (preproc_ifndef name: (identifier) body: (block_items (preproc_def name: (identifier)))))"
    );
    let guard = tree.root_node().child(0).unwrap();
    assert_eq!(guard.start_byte(), 0);
    assert_eq!(guard.end_byte(), tree.source().len());
}

#[test]
fn test_empty_body() {
    assert_eq!(
        sexp("#ifdef A\n#endif\n"),
        "(translation_unit (preproc_ifdef name: (identifier)))"
    );
}

#[test]
fn test_nested_conditionals() {
    let tree = parse("#if A\n#if B\nx\n#endif\n#endif\n");
    let outer = tree.root_node().child(0).unwrap();
    let body = outer.child_by_field_name("body").unwrap();
    let inner = body.child(0).unwrap();
    assert_eq!(inner.kind(), SyntaxKind::PreprocIf);
    assert_eq!(inner.text(), "#if B\nx\n#endif\n");
    assert!(!tree.has_error());
}

#[test]
fn test_elifdef() {
    assert_eq!(
        sexp("#ifdef A\n#elifdef B\n#elifndef C\n#endif\n"),
        "(translation_unit (preproc_ifdef name: (identifier) alternative: (preproc_elifdef name: (identifier) alternative: (preproc_elifndef name: (identifier)))))"
    );
}

// Expressions
fn condition(source: &str) -> String {
    let tree = parse(source);
    assert!(!tree.has_error(), "{:?}", tree);
    let directive = tree.root_node().child(0).unwrap();
    directive.child_by_field_name("condition").unwrap().to_sexp()
}

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        condition("#if A + B * C\n#endif\n"),
        "(binary_expression left: (identifier) right: (binary_expression left: (identifier) right: (identifier)))"
    );
}

#[test]
fn test_subtraction_is_left_associative() {
    assert_eq!(
        condition("#if A - B - C\n#endif\n"),
        "(binary_expression left: (binary_expression left: (identifier) right: (identifier)) right: (identifier))"
    );
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    assert_eq!(
        condition("#if -A * B\n#endif\n"),
        "(binary_expression left: (unary_expression argument: (identifier)) right: (identifier))"
    );
}

#[test]
fn test_defined_forms() {
    assert_eq!(
        condition("#if defined(X) && !defined Y\n#endif\n"),
        "(binary_expression left: (preproc_defined name: (identifier)) right: (unary_expression argument: (preproc_defined name: (identifier))))"
    );
}

#[test]
fn test_parentheses_and_logical_operators() {
    assert_eq!(
        condition("#if (A || B) && C\n#endif\n"),
        "(binary_expression left: (parenthesized_expression expr: (binary_expression left: (identifier) right: (identifier))) right: (identifier))"
    );
}

#[test]
fn test_conditional_expression() {
    assert_eq!(
        condition("#if A ? B : C\n#endif\n"),
        "(conditional_expression condition: (identifier) consequence: (identifier) alternative: (identifier))"
    );
}

#[test]
fn test_call_in_condition() {
    assert_eq!(
        condition("#if FOO(1, 'c')\n#endif\n"),
        "(call_expression function: (identifier) arguments: (argument_list argument: (number_literal) argument: (char_literal)))"
    );
}

#[test]
fn test_has_include_takes_a_header_name() {
    let source = "#if __has_include(<stdio.h>) && __has_include(\"a.h\")\n#endif\n";
    let tree = parse(source);
    assert!(!tree.has_error(), "{:?}", tree.errors());
    let header = find(tree.root_node(), SyntaxKind::SystemLibString).unwrap();
    assert_eq!(header.text(), "<stdio.h>");
    assert_eq!(
        condition("#if __has_include(<stdio.h>)\n#endif\n"),
        "(call_expression function: (identifier) arguments: (argument_list argument: (system_lib_string)))"
    );
}

#[test]
fn test_less_than_in_call_stays_an_operator() {
    assert_eq!(
        condition("#if F(a < b)\n#endif\n"),
        "(call_expression function: (identifier) arguments: (argument_list argument: (binary_expression left: (identifier) right: (identifier))))"
    );
}

#[test]
fn test_operator_field() {
    let tree = parse("#if A << 2\n#endif\n");
    let condition = find(tree.root_node(), SyntaxKind::BinaryExpression).unwrap();
    let operator = condition.child_by_field_name("operator").unwrap();
    assert_eq!(operator.kind(), SyntaxKind::LtLt);
    assert_eq!(operator.text(), "<<");
    assert!(!operator.is_named());
}
