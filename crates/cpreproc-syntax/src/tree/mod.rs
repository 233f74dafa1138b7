//! Immutable syntax trees.
//!
//! A [`Tree`] owns the source it was parsed from and a root [`Subtree`].
//! Subtrees are reference counted and position independent, so cloning a
//! tree is cheap and an incremental reparse can share nodes with the tree
//! it started from.

mod edit;
mod node;
mod sink;
pub(crate) mod subtree;

pub use edit::{InputEdit, Point};
pub use node::{Children, Node};

use std::fmt;
use std::sync::Arc;

use text_size::{TextRange, TextSize};

use crate::language::Language;
use crate::parser::ParseError;
use crate::syntax::SyntaxNode;
use subtree::Subtree;

/// The result of a parse.
#[derive(Clone)]
pub struct Tree {
    root: Subtree,
    source: Arc<str>,
    language: &'static Language,
}

impl Tree {
    pub(crate) fn new(root: Subtree, source: Arc<str>, language: &'static Language) -> Self {
        debug_assert_eq!(root.total_len(), source.len());
        Self {
            root,
            source,
            language,
        }
    }

    /// The root node, spanning the whole source.
    #[must_use]
    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, &self.root, 0, None)
    }

    /// The text this tree was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The language this tree was parsed with.
    #[must_use]
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// Returns `true` if the tree contains `ERROR` or missing nodes.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.root.has_error()
    }

    /// Lists the `ERROR` and missing nodes in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<ParseError> {
        let mut errors = Vec::new();
        if self.has_error() {
            collect_errors(self.root_node(), &mut errors);
        }
        errors
    }

    /// Builds the lossless `rowan` view of this tree.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(sink::build(&self.root, &self.source))
    }

    pub(crate) fn root(&self) -> &Subtree {
        &self.root
    }
}

fn collect_errors(node: Node<'_>, errors: &mut Vec<ParseError>) {
    if node.is_error() {
        let message = match node.first_token_text() {
            Some(text) => format!("unexpected {}", quote(text)),
            None => "unexpected end of input".to_string(),
        };
        errors.push(ParseError {
            message,
            range: node.text_range(),
        });
        return;
    }
    if node.is_missing() {
        let name = node.kind_name();
        let message = if node.is_named() {
            format!("missing {name}")
        } else {
            format!("missing {}", quote(name))
        };
        let at = TextSize::from(u32::try_from(node.start_byte()).unwrap_or(u32::MAX));
        errors.push(ParseError {
            message,
            range: TextRange::empty(at),
        });
        return;
    }
    for child in node.children() {
        if child.has_error() {
            collect_errors(child, errors);
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.escape_debug())
}

/// Trees are equal when they have the same structure over the same text
/// and come from the same grammar build.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.language.fingerprint() == other.language.fingerprint()
            && self.source == other.source
            && self.root == other.root
    }
}

impl Eq for Tree {}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root_node().to_sexp())
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}
