//! Reference-counted immutable subtrees.
//!
//! A subtree stores only relative sizes: the padding before its first byte
//! and its own size. The absolute position of a node is the sum of what
//! comes before it, so a subtree can be shared between an old tree and a
//! new one after an edit without being touched.

use std::sync::Arc;

use crate::grammar::table::StateId;
use crate::grammar::FieldId;
use crate::scanner::{ExternalState, ValidSymbols};
use crate::syntax::SyntaxKind;

/// A child slot: the field it fills, if any, and the subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Child {
    pub(crate) field: Option<FieldId>,
    pub(crate) subtree: Subtree,
}

#[derive(Debug)]
struct SubtreeData {
    symbol: SyntaxKind,
    padding: usize,
    size: usize,
    is_error: bool,
    is_missing: bool,
    is_extra: bool,
    has_error: bool,
    /// Built while a runtime conflict was being settled.
    is_fragile: bool,
    children: Vec<Child>,
    /// Parser state the node was built on top of.
    pre_state: StateId,
    /// Bytes past the end the parser examined before reducing this node.
    lookahead_bytes: usize,
    /// Scanner state after the last token of the node.
    end_state: ExternalState,
    /// External tokens the token after this one was lexed against.
    follow_valid: ValidSymbols,
}

/// A shared, immutable syntax subtree.
#[derive(Debug, Clone)]
pub(crate) struct Subtree(Arc<SubtreeData>);

impl Subtree {
    /// A token leaf.
    pub(crate) fn leaf(
        symbol: SyntaxKind,
        padding: usize,
        size: usize,
        pre_state: StateId,
        end_state: ExternalState,
        follow_valid: ValidSymbols,
    ) -> Self {
        Self(Arc::new(SubtreeData {
            symbol,
            padding,
            size,
            is_error: false,
            is_missing: false,
            is_extra: symbol.is_extra(),
            has_error: symbol == SyntaxKind::Unknown,
            is_fragile: false,
            children: Vec::new(),
            pre_state,
            lookahead_bytes: 0,
            end_state,
            follow_valid,
        }))
    }

    /// A zero-width token inserted by error recovery.
    pub(crate) fn missing(symbol: SyntaxKind, pre_state: StateId) -> Self {
        Self(Arc::new(SubtreeData {
            symbol,
            padding: 0,
            size: 0,
            is_error: false,
            is_missing: true,
            is_extra: false,
            has_error: true,
            is_fragile: false,
            children: Vec::new(),
            pre_state,
            lookahead_bytes: 0,
            end_state: ExternalState::default(),
            follow_valid: ValidSymbols::EMPTY,
        }))
    }

    /// An interior node over `children`.
    pub(crate) fn node(
        symbol: SyntaxKind,
        children: Vec<Child>,
        pre_state: StateId,
        lookahead_bytes: usize,
        is_fragile: bool,
    ) -> Self {
        Self::build(symbol, children, pre_state, lookahead_bytes, is_fragile, false)
    }

    /// An `ERROR` node; it sits on the parse stack like an extra.
    pub(crate) fn error(children: Vec<Child>, pre_state: StateId) -> Self {
        Self::build(SyntaxKind::Error, children, pre_state, 0, false, true)
    }

    fn build(
        symbol: SyntaxKind,
        children: Vec<Child>,
        pre_state: StateId,
        lookahead_bytes: usize,
        is_fragile: bool,
        is_error: bool,
    ) -> Self {
        let padding = children.first().map_or(0, |child| child.subtree.padding());
        let total: usize = children.iter().map(|child| child.subtree.total_len()).sum();
        let has_error = is_error || children.iter().any(|child| child.subtree.has_error());
        let (end_state, follow_valid) = children.last().map_or_else(Default::default, |child| {
            (child.subtree.end_state(), child.subtree.follow_valid())
        });
        Self(Arc::new(SubtreeData {
            symbol,
            padding,
            size: total - padding,
            is_error,
            is_missing: false,
            is_extra: is_error,
            has_error,
            is_fragile,
            children,
            pre_state,
            lookahead_bytes,
            end_state,
            follow_valid,
        }))
    }

    /// The root node: it starts at byte 0 and spans the whole source.
    pub(crate) fn root(symbol: SyntaxKind, children: Vec<Child>, source_len: usize) -> Self {
        let has_error = children.iter().any(|child| child.subtree.has_error());
        let end_state = children
            .last()
            .map(|child| child.subtree.end_state())
            .unwrap_or_default();
        Self(Arc::new(SubtreeData {
            symbol,
            padding: 0,
            size: source_len,
            is_error: false,
            is_missing: false,
            is_extra: false,
            has_error,
            is_fragile: false,
            children,
            pre_state: 0,
            lookahead_bytes: 0,
            end_state,
            follow_valid: ValidSymbols::EMPTY,
        }))
    }

    pub(crate) fn symbol(&self) -> SyntaxKind {
        self.0.symbol
    }

    pub(crate) fn padding(&self) -> usize {
        self.0.padding
    }

    pub(crate) fn size(&self) -> usize {
        self.0.size
    }

    /// Padding plus size.
    pub(crate) fn total_len(&self) -> usize {
        self.0.padding + self.0.size
    }

    pub(crate) fn is_error(&self) -> bool {
        self.0.is_error
    }

    pub(crate) fn is_missing(&self) -> bool {
        self.0.is_missing
    }

    pub(crate) fn is_extra(&self) -> bool {
        self.0.is_extra
    }

    pub(crate) fn has_error(&self) -> bool {
        self.0.has_error
    }

    pub(crate) fn is_fragile(&self) -> bool {
        self.0.is_fragile
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.0.children.is_empty() && self.0.symbol.is_token()
    }

    pub(crate) fn children(&self) -> &[Child] {
        &self.0.children
    }

    pub(crate) fn pre_state(&self) -> StateId {
        self.0.pre_state
    }

    pub(crate) fn lookahead_bytes(&self) -> usize {
        self.0.lookahead_bytes
    }

    pub(crate) fn end_state(&self) -> ExternalState {
        self.0.end_state
    }

    pub(crate) fn follow_valid(&self) -> ValidSymbols {
        self.0.follow_valid
    }

    /// Takes the children out, copying them if the subtree is shared.
    pub(crate) fn into_children(self) -> Vec<Child> {
        match Arc::try_unwrap(self.0) {
            Ok(data) => data.children,
            Err(shared) => shared.children.clone(),
        }
    }

    /// The first token of this subtree, if it has any.
    pub(crate) fn first_leaf(&self) -> Option<&Subtree> {
        let mut current = self;
        loop {
            if current.is_leaf() {
                return Some(current);
            }
            current = &current.children().first()?.subtree;
        }
    }

    /// Returns `true` if both handles point at the same allocation.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Structural equality: kind, widths, flags and children. Parser
/// bookkeeping used for reuse is ignored.
impl PartialEq for Subtree {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (&*self.0, &*other.0);
        a.symbol == b.symbol
            && a.padding == b.padding
            && a.size == b.size
            && a.is_error == b.is_error
            && a.is_missing == b.is_missing
            && a.is_extra == b.is_extra
            && a.children == b.children
    }
}

impl Eq for Subtree {}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(symbol: SyntaxKind, padding: usize, size: usize) -> Subtree {
        Subtree::leaf(
            symbol,
            padding,
            size,
            0,
            ExternalState::default(),
            ValidSymbols::EMPTY,
        )
    }

    fn child(subtree: Subtree) -> Child {
        Child {
            field: None,
            subtree,
        }
    }

    #[test]
    fn test_node_widths_come_from_children() {
        let node = Subtree::node(
            SyntaxKind::CTokens,
            vec![
                child(leaf(SyntaxKind::Identifier, 2, 3)),
                child(leaf(SyntaxKind::Plus, 1, 1)),
            ],
            0,
            0,
            false,
        );
        assert_eq!(node.padding(), 2);
        assert_eq!(node.size(), 5);
        assert_eq!(node.total_len(), 7);
        assert!(!node.has_error());
        assert_eq!(node.first_leaf().map(Subtree::symbol), Some(SyntaxKind::Identifier));
    }

    #[test]
    fn test_errors_propagate() {
        let missing = Subtree::missing(SyntaxKind::Identifier, 0);
        let node = Subtree::node(
            SyntaxKind::PreprocUndef,
            vec![child(leaf(SyntaxKind::DirUndef, 0, 6)), child(missing)],
            0,
            0,
            false,
        );
        assert!(node.has_error());
        assert!(!node.is_error());

        let error = Subtree::error(vec![child(leaf(SyntaxKind::RParen, 0, 1))], 0);
        assert!(error.is_error());
        assert!(error.is_extra());
    }

    #[test]
    fn test_structural_equality_ignores_bookkeeping() {
        let a = Subtree::node(
            SyntaxKind::CTokens,
            vec![child(leaf(SyntaxKind::Identifier, 0, 1))],
            3,
            8,
            false,
        );
        let b = Subtree::node(
            SyntaxKind::CTokens,
            vec![child(leaf(SyntaxKind::Identifier, 0, 1))],
            5,
            2,
            true,
        );
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, leaf(SyntaxKind::Identifier, 0, 1));
    }
}
