//! Borrowed navigation over a [`Tree`].

use std::fmt::{self, Write as _};
use std::iter::FusedIterator;

use text_size::{TextRange, TextSize};

use super::subtree::{Child, Subtree};
use super::Tree;
use crate::grammar::FieldId;
use crate::syntax::SyntaxKind;

/// A node of a [`Tree`] with its absolute position.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    subtree: &'tree Subtree,
    /// Byte offset where the node's padding begins.
    offset: usize,
    field: Option<FieldId>,
}

impl<'tree> Node<'tree> {
    pub(super) fn new(
        tree: &'tree Tree,
        subtree: &'tree Subtree,
        offset: usize,
        field: Option<FieldId>,
    ) -> Self {
        Self {
            tree,
            subtree,
            offset,
            field,
        }
    }

    /// The node's kind.
    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.subtree.symbol()
    }

    /// The grammar name of the node's kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind().name()
    }

    /// The numeric symbol id.
    #[must_use]
    pub fn symbol(&self) -> u16 {
        self.kind().to_raw()
    }

    /// Returns `true` for named nodes, `false` for punctuation.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.kind().is_named()
    }

    /// Returns `true` for `ERROR` nodes.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.subtree.is_error()
    }

    /// Returns `true` for zero-width tokens inserted by error recovery.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.subtree.is_missing()
    }

    /// Returns `true` for comments and `ERROR` nodes.
    #[must_use]
    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    /// Returns `true` if this node is or contains an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    /// Byte offset of the first byte.
    #[must_use]
    pub fn start_byte(&self) -> usize {
        self.offset + self.subtree.padding()
    }

    /// Byte offset one past the last byte.
    #[must_use]
    pub fn end_byte(&self) -> usize {
        self.start_byte() + self.subtree.size()
    }

    /// The node's byte range.
    #[must_use]
    pub fn text_range(&self) -> TextRange {
        TextRange::new(to_text_size(self.start_byte()), to_text_size(self.end_byte()))
    }

    /// The source text covered by the node.
    #[must_use]
    pub fn text(&self) -> &'tree str {
        self.tree
            .source
            .get(self.start_byte()..self.end_byte())
            .unwrap_or_default()
    }

    /// Number of children, named or not.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.subtree.children().len()
    }

    /// Number of named children.
    #[must_use]
    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    /// The child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        self.children().nth(index)
    }

    /// The named child at `index` among named children.
    #[must_use]
    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.named_children().nth(index)
    }

    /// All children in order.
    #[must_use]
    pub fn children(&self) -> Children<'tree> {
        Children {
            tree: self.tree,
            children: self.subtree.children().iter(),
            offset: self.offset,
        }
    }

    /// Named children in order.
    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + 'tree {
        self.children().filter(Node::is_named)
    }

    /// The first child filling the field `name`.
    #[must_use]
    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        self.children_by_field_name(name).next()
    }

    /// Every child filling the field `name`.
    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'tree>> + 'tree {
        let id = self.tree.language.field_id_for_name(name);
        self.children()
            .filter(move |child| id.is_some() && child.field == id)
    }

    /// The field filled by the child at `index`.
    #[must_use]
    pub fn field_name_for_child(&self, index: usize) -> Option<&'static str> {
        let field = self.subtree.children().get(index)?.field?;
        self.tree.language.field_name(field)
    }

    /// The field this node fills in its parent.
    #[must_use]
    pub fn field_name(&self) -> Option<&'static str> {
        self.tree.language.field_name(self.field?)
    }

    /// Renders the node as an s-expression of named nodes.
    ///
    /// Missing nodes print as `(MISSING name)`; fields prefix their child as
    /// `field: (child)`.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out, None);
        out
    }

    fn write_sexp(&self, out: &mut String, field: Option<&str>) {
        if let Some(field) = field {
            out.push_str(field);
            out.push_str(": ");
        }
        if self.is_missing() {
            if self.is_named() {
                let _ = write!(out, "(MISSING {})", self.kind_name());
            } else {
                let _ = write!(out, "(MISSING \"{}\")", self.kind_name().escape_debug());
            }
            return;
        }
        out.push('(');
        out.push_str(self.kind_name());
        for (index, child) in self.children().enumerate() {
            if !child.is_named() && !child.is_missing() {
                continue;
            }
            out.push(' ');
            child.write_sexp(out, self.field_name_for_child(index));
        }
        out.push(')');
    }

    /// Text of the first non-empty token inside the node.
    pub(super) fn first_token_text(&self) -> Option<&'tree str> {
        if self.subtree.is_leaf() {
            return (self.subtree.size() > 0).then(|| self.text());
        }
        self.children().find_map(|child| child.first_token_text())
    }

    #[cfg(test)]
    pub(crate) fn subtree(&self) -> &'tree Subtree {
        self.subtree
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}..{}",
            self.kind_name(),
            self.start_byte(),
            self.end_byte()
        )
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && self.subtree.ptr_eq(other.subtree)
            && self.offset == other.offset
    }
}

impl Eq for Node<'_> {}

/// Iterator over the children of a [`Node`].
#[derive(Debug, Clone)]
pub struct Children<'tree> {
    tree: &'tree Tree,
    children: std::slice::Iter<'tree, Child>,
    offset: usize,
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.children.next()?;
        let node = Node::new(self.tree, &child.subtree, self.offset, child.field);
        self.offset += child.subtree.total_len();
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}

fn to_text_size(offset: usize) -> TextSize {
    TextSize::from(u32::try_from(offset).unwrap_or(u32::MAX))
}
