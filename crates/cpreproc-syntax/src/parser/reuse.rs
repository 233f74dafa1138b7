//! Finding subtrees of the old tree that survive an edit.
//!
//! The engine asks for candidates in increasing byte order, so the old tree
//! is walked once with a cursor that only moves forward.

use crate::scanner::logical_line_start;
use crate::tree::subtree::Subtree;
use crate::tree::{InputEdit, Tree};

/// Old tree, the edit that produced the new text, and a cursor into the
/// old tree.
pub(super) struct Reuse<'t> {
    old: &'t Tree,
    edit: InputEdit,
    cursor: ReusableNode<'t>,
}

impl<'t> Reuse<'t> {
    pub(super) fn new(old: &'t Tree, edit: InputEdit) -> Self {
        Self {
            old,
            edit,
            cursor: ReusableNode::new(old.root()),
        }
    }

    /// Finds the outermost undamaged old node whose padding starts at new
    /// offset `position` and that `accept` agrees to, and moves past it.
    pub(super) fn take(
        &mut self,
        position: usize,
        mut accept: impl FnMut(&Subtree) -> bool,
    ) -> Option<&'t Subtree> {
        let old_position = self.edit.map_new_offset(position)?;
        while let Some(candidate) = self.cursor.seek(old_position) {
            if self.is_undamaged(candidate, old_position)
                && !self.cursor.precedes_error()
                && accept(candidate)
            {
                self.cursor.advance();
                return Some(candidate);
            }
            self.cursor.reject();
        }
        None
    }

    /// Checks that nothing the node depended on was edited: from the start
    /// of the logical line of its first byte (or its padding, if earlier)
    /// through the last byte looked at before it was reduced.
    fn is_undamaged(&self, node: &Subtree, offset: usize) -> bool {
        if node.is_leaf() || node.has_error() || node.is_fragile() || node.size() == 0 {
            return false;
        }
        let content_start = offset + node.padding();
        let window_start = offset.min(logical_line_start(self.old.source(), content_start));
        let window_end = offset + node.total_len() + node.lookahead_bytes();
        window_end < self.edit.start_byte || window_start > self.edit.old_end_byte
    }
}

struct Entry<'t> {
    subtree: &'t Subtree,
    /// Old offset where the subtree's padding starts.
    offset: usize,
    /// Index in the parent's children.
    index: usize,
}

/// A forward-only cursor over the old tree, positioned on one subtree.
struct ReusableNode<'t> {
    stack: Vec<Entry<'t>>,
}

impl<'t> ReusableNode<'t> {
    /// Positions the cursor on the root's first child; the root itself is
    /// never a candidate.
    fn new(root: &'t Subtree) -> Self {
        let mut cursor = Self {
            stack: vec![Entry {
                subtree: root,
                offset: 0,
                index: 0,
            }],
        };
        if !cursor.descend() {
            cursor.stack.clear();
        }
        cursor
    }

    /// Skips subtrees that end before `position` and descends into those
    /// containing it. Returns the current subtree if it starts exactly at
    /// `position`.
    fn seek(&mut self, position: usize) -> Option<&'t Subtree> {
        loop {
            let entry = self.stack.last()?;
            if entry.offset > position {
                return None;
            }
            if entry.offset == position {
                return Some(entry.subtree);
            }
            let end = entry.offset + entry.subtree.total_len();
            if end <= position || !self.descend() {
                self.advance();
            }
        }
    }

    /// Moves to the current subtree's first child, or past it if it has
    /// none.
    fn reject(&mut self) {
        if !self.descend() {
            self.advance();
        }
    }

    /// Whether the next sibling of the current subtree is an `ERROR` node or
    /// a missing token, which recovery built with this subtree in view.
    fn precedes_error(&self) -> bool {
        let [.., parent, entry] = self.stack.as_slice() else {
            return false;
        };
        parent
            .subtree
            .children()
            .get(entry.index + 1)
            .is_some_and(|next| next.subtree.is_error() || next.subtree.is_missing())
    }

    fn descend(&mut self) -> bool {
        let Some(entry) = self.stack.last() else {
            return false;
        };
        let Some(first) = entry.subtree.children().first() else {
            return false;
        };
        let offset = entry.offset;
        self.stack.push(Entry {
            subtree: &first.subtree,
            offset,
            index: 0,
        });
        true
    }

    /// Moves to the next subtree in document order that is not inside the
    /// current one.
    fn advance(&mut self) {
        while let Some(entry) = self.stack.pop() {
            // The root has no siblings; popping it ends the walk.
            let Some(parent) = self.stack.last() else {
                return;
            };
            let next = entry.index + 1;
            if let Some(sibling) = parent.subtree.children().get(next) {
                let offset = entry.offset + entry.subtree.total_len();
                self.stack.push(Entry {
                    subtree: &sibling.subtree,
                    offset,
                    index: next,
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::SyntaxKind;

    fn kinds_at(tree: &Tree, positions: &[usize]) -> Vec<Option<SyntaxKind>> {
        let mut cursor = ReusableNode::new(tree.root());
        positions
            .iter()
            .map(|&position| cursor.seek(position).map(Subtree::symbol))
            .collect()
    }

    #[test]
    fn test_cursor_finds_outermost_nodes() {
        let tree = parse("#undef A\n#undef B\nx y\n");
        assert_eq!(
            kinds_at(&tree, &[0, 3, 9, 18]),
            vec![
                Some(SyntaxKind::PreprocUndef),
                None,
                Some(SyntaxKind::PreprocUndef),
                Some(SyntaxKind::CTokens),
            ]
        );
    }

    #[test]
    fn test_reject_descends_into_children() {
        let tree = parse("#undef A\n");
        let mut cursor = ReusableNode::new(tree.root());
        assert_eq!(cursor.seek(0).map(Subtree::symbol), Some(SyntaxKind::PreprocUndef));
        cursor.reject();
        assert_eq!(cursor.seek(0).map(Subtree::symbol), Some(SyntaxKind::DirUndef));
        cursor.reject();
        assert_eq!(cursor.seek(0), None);
        assert_eq!(cursor.seek(6).map(Subtree::symbol), Some(SyntaxKind::Identifier));
    }

    #[test]
    fn test_node_before_error_is_flagged() {
        let tree = parse("#define A 1\n#endif\n#define B 2\n");
        let mut cursor = ReusableNode::new(tree.root());
        assert_eq!(cursor.seek(0).map(Subtree::symbol), Some(SyntaxKind::PreprocDef));
        assert!(cursor.precedes_error());
        assert_eq!(cursor.seek(19).map(Subtree::symbol), Some(SyntaxKind::PreprocDef));
        assert!(!cursor.precedes_error());
    }

    #[test]
    fn test_damage_window() {
        let source = "#undef A\n#undef B\n\n#undef C\n";
        let tree = parse(source);
        let first = tree.root_node().child(0).unwrap();
        let third = tree.root_node().child(2).unwrap();

        let far = Reuse::new(&tree, InputEdit::new(26, 27, 27));
        assert!(far.is_undamaged(first.subtree(), 0));
        assert!(!far.is_undamaged(third.subtree(), 18));

        let touching = Reuse::new(&tree, InputEdit::new(0, 0, 1));
        assert!(!touching.is_undamaged(first.subtree(), 0));
    }
}
