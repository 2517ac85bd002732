use gstr_parser::{parse, parse_with, ParserConfig};
use gstr_syntax::{SyntaxKind, SyntaxNode};
use rstest::rstest;

fn single_expr(source: &str) -> SyntaxNode {
    let parse = parse(source);
    assert!(parse.errors.is_empty(), "{}: {:?}", source, parse.errors);
    let file = parse.source_file().unwrap();
    let exprs: Vec<_> = file.expressions().cloned().collect();
    assert_eq!(exprs.len(), 1, "{}", source);
    exprs.into_iter().next().unwrap()
}

/// Kinds of the expression's direct child nodes.
fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.child_nodes().map(|n| n.kind()).collect()
}

#[rstest]
#[case("42", SyntaxKind::Literal)]
#[case("1.5", SyntaxKind::Literal)]
#[case("null", SyntaxKind::Literal)]
#[case("'plain ${not} interpolated'", SyntaxKind::Literal)]
#[case("name", SyntaxKind::NameRef)]
#[case("(a)", SyntaxKind::ParenExpr)]
#[case("[1, 2, 3]", SyntaxKind::ListExpr)]
#[case("[]", SyntaxKind::ListExpr)]
#[case("-a", SyntaxKind::PrefixExpr)]
#[case("!a", SyntaxKind::PrefixExpr)]
#[case("a || b && c", SyntaxKind::BinaryExpr)]
#[case("a ? b : c", SyntaxKind::TernaryExpr)]
#[case("a ?: b", SyntaxKind::ElvisExpr)]
#[case("a = b", SyntaxKind::AssignExpr)]
#[case("f(a, b)", SyntaxKind::CallExpr)]
#[case("a.b", SyntaxKind::FieldExpr)]
#[case("a?.b", SyntaxKind::FieldExpr)]
#[case("a[0]", SyntaxKind::IndexExpr)]
#[case("\"x${y}\"", SyntaxKind::GString)]
fn test_expression_kinds(#[case] source: &str, #[case] kind: SyntaxKind) {
    assert_eq!(single_expr(source).kind(), kind);
}

#[test]
fn test_assignment_is_right_associative() {
    let expr = single_expr("a = b = c");
    assert_eq!(child_kinds(&expr), vec![SyntaxKind::NameRef, SyntaxKind::AssignExpr]);
}

#[test]
fn test_ternary_binds_looser_than_or() {
    let expr = single_expr("a || b ? c : d");
    assert_eq!(
        child_kinds(&expr),
        vec![SyntaxKind::BinaryExpr, SyntaxKind::NameRef, SyntaxKind::NameRef]
    );
}

#[test]
fn test_postfix_chain() {
    let expr = single_expr("a.b(c)[d]");
    assert_eq!(expr.kind(), SyntaxKind::IndexExpr);
    let call = expr.child_nodes().next().unwrap();
    assert_eq!(call.kind(), SyntaxKind::CallExpr);
    assert_eq!(child_kinds(call), vec![SyntaxKind::FieldExpr, SyntaxKind::ArgList]);
}

#[test]
fn test_interpolated_string_as_operand() {
    let expr = single_expr("\"a\" + \"${b}\"");
    assert_eq!(child_kinds(&expr), vec![SyntaxKind::GString, SyntaxKind::GString]);
}

#[rstest]
#[case("a +", "expression expected")]
#[case("(a", "')' expected")]
#[case("[a, b", "']' expected")]
#[case("f(a", "')' expected")]
#[case("a.", "identifier expected")]
#[case("a ? b", "':' expected")]
fn test_recoverable_errors(#[case] source: &str, #[case] message: &str) {
    let parse = parse(source);
    let messages: Vec<_> = parse.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec![message]);
    // The expression is still committed.
    assert_eq!(parse.source_file().unwrap().expressions().count(), 1);
}

#[test]
fn test_expression_depth_limit() {
    let config = ParserConfig::default().with_max_expression_depth(8);
    let source = format!("{}x{}", "(".repeat(20), ")".repeat(20));
    let parse = parse_with(&source, config);

    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].message, "expression nested too deeply");
    assert!(parse.root.descendants().iter().any(|n| n.kind() == SyntaxKind::Error));
}

#[test]
fn test_deep_prefix_chain_does_not_overflow() {
    let source = format!("{}x", "-".repeat(100_000));
    let parse = parse(&source);
    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].message, "expression nested too deeply");
}

#[rstest]
#[case::fields("a.b.c.d.e.f.g")]
#[case::calls("f()()()()()()")]
#[case::binary("a + b - c + d - e + f")]
fn test_chain_past_the_depth_limit_is_kept_flat(#[case] source: &str) {
    let config = ParserConfig::default().with_max_expression_depth(4);
    let parse = parse_with(source, config);
    let messages: Vec<_> = parse.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["expression nested too deeply"]);

    let stmt = parse.root.first_child_of(SyntaxKind::ExprStmt).unwrap();
    let expr = stmt.child_nodes().next().unwrap();
    assert_eq!(expr.kind(), SyntaxKind::Error);
    assert_eq!(expr.text(source), source);

    // Error, three chain links, then the innermost operand.
    let mut levels = 0;
    let mut node = Some(expr);
    while let Some(n) = node {
        levels += 1;
        node = n.child_nodes().next();
    }
    assert_eq!(levels, 5);
}

#[test]
fn test_prefix_at_the_limit_leaves_closer_in_place() {
    let config = ParserConfig::default().with_max_expression_depth(1);
    let parse = parse_with("(-)", config);
    let messages: Vec<_> = parse.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["expression nested too deeply"]);

    let file = parse.source_file().unwrap();
    let paren = file.expressions().next().unwrap();
    assert_eq!(paren.kind(), SyntaxKind::ParenExpr);
    assert_eq!(paren.text("(-)"), "(-)");
}
