//! Lossless `rowan` view of a parsed tree.
//!
//! Padding is not part of the parse tree proper; the sink re-lexes it so the
//! green tree carries every byte, with whitespace, newline and continuation
//! tokens in front of the token they pad.

use rowan::{GreenNode, GreenNodeBuilder};

use super::subtree::Subtree;
use crate::lexer;
use crate::syntax::SyntaxKind;

/// Builds the green tree for `root` over `source`.
pub(super) fn build(root: &Subtree, source: &str) -> GreenNode {
    let mut sink = Sink {
        source,
        cursor: 0,
        builder: GreenNodeBuilder::new(),
    };
    sink.builder.start_node(root.symbol().into());
    for child in root.children() {
        sink.subtree(&child.subtree);
    }
    sink.padding(source.len());
    sink.builder.finish_node();
    sink.builder.finish()
}

struct Sink<'src> {
    source: &'src str,
    cursor: usize,
    builder: GreenNodeBuilder<'static>,
}

impl Sink<'_> {
    fn subtree(&mut self, subtree: &Subtree) {
        if subtree.is_leaf() {
            let start = self.cursor + subtree.padding();
            self.padding(start);
            let end = start + subtree.size();
            self.token(subtree.symbol(), end);
            return;
        }
        self.builder.start_node(subtree.symbol().into());
        for child in subtree.children() {
            self.subtree(&child.subtree);
        }
        self.builder.finish_node();
    }

    /// Emits the padding between the cursor and `end`.
    fn padding(&mut self, end: usize) {
        let Some(text) = self.source.get(self.cursor..end) else {
            return;
        };
        let base = self.cursor;
        for token in lexer::lex(text) {
            let token_end = base + usize::from(token.range.end());
            self.token(SyntaxKind::from(token.kind), token_end);
        }
    }

    fn token(&mut self, kind: SyntaxKind, end: usize) {
        let text = self.source.get(self.cursor..end).unwrap_or_default();
        self.builder.token(kind.into(), text);
        self.cursor = end;
    }
}
