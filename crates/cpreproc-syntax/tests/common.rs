//! Shared helpers for parser tests.
#![allow(dead_code, unused_imports)]

pub use cpreproc_syntax::{parse, InputEdit, Node, Parser, SyntaxKind, Tree};

/// S-expression of the tree for `source`.
pub fn sexp(source: &str) -> String {
    parse(source).root_node().to_sexp()
}

/// Error messages for `source`, with their ranges.
pub fn errors(source: &str) -> Vec<String> {
    parse(source)
        .errors()
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Kinds of the direct children of `node`.
pub fn child_kinds(node: Node<'_>) -> Vec<SyntaxKind> {
    node.children().map(|child| child.kind()).collect()
}

/// The first descendant of kind `kind`, in document order.
pub fn find(node: Node<'_>, kind: SyntaxKind) -> Option<Node<'_>> {
    if node.kind() == kind {
        return Some(node);
    }
    node.children().find_map(|child| find(child, kind))
}

/// Checks the structural invariants every tree must satisfy.
pub fn assert_well_formed(tree: &Tree) {
    let root = tree.root_node();
    assert_eq!(root.kind(), SyntaxKind::TranslationUnit);
    assert_eq!(root.end_byte(), tree.source().len());
    assert_ranges_nest(root);
    assert_eq!(
        tree.syntax().text().to_string(),
        tree.source(),
        "lossless view lost text"
    );
}

fn assert_ranges_nest(node: Node<'_>) {
    let mut previous_end = node.start_byte();
    for child in node.children() {
        assert!(
            child.start_byte() >= previous_end,
            "{:?} starts before its previous sibling ends",
            child
        );
        assert!(
            child.end_byte() <= node.end_byte(),
            "{:?} ends after its parent {:?}",
            child,
            node
        );
        previous_end = child.end_byte();
        assert_ranges_nest(child);
    }
}

/// Reparses `old` into `new` through the minimal edit and checks the result
/// against a fresh parse.
pub fn assert_reparse_matches(parser: &mut Parser, old: &Tree, new: &str) -> Tree {
    let edit = InputEdit::diff(old.source(), new);
    let reparsed = parser
        .reparse(old, &edit, new)
        .expect("edit from diff is valid");
    let fresh = parse(new);
    assert_eq!(
        reparsed,
        fresh,
        "reparse differs from fresh parse\nold: {:?}\nnew: {:?}",
        old.source(),
        new
    );
    reparsed
}
