//! External scanner interface.
//!
//! The engine consults an [`ExternalScanner`] before the static lexer at
//! every token position. The scanner sees the source through a [`Cursor`]
//! and is told which external tokens the current parse state accepts.

mod preproc;

pub use preproc::PreprocScanner;

use std::fmt;

use crate::syntax::{SyntaxKind, EXTERNAL_TOKENS};

/// A stateful tokenizer for context-sensitive tokens.
pub trait ExternalScanner: Send {
    /// Tries to recognize an external token at the cursor.
    ///
    /// Returns the index (into the language's external token list) of the
    /// matched token, which ends at the cursor's marked end. On `None` the
    /// scanner state must be left untouched.
    fn scan(&mut self, cursor: &mut Cursor<'_>, valid: ValidSymbols) -> Option<usize>;

    /// Writes the scanner state into `buf`.
    fn serialize(&self, buf: &mut ExternalState);

    /// Restores a state written by [`ExternalScanner::serialize`].
    fn deserialize(&mut self, state: &ExternalState);

    /// Returns the scanner to its initial state.
    fn reset(&mut self);
}

/// Set of external tokens, indexed like [`EXTERNAL_TOKENS`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValidSymbols(u32);

impl ValidSymbols {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if the token with external index `index` is in the set.
    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    /// Returns `true` if `kind` is an external token in the set.
    #[must_use]
    pub fn contains_kind(self, kind: SyntaxKind) -> bool {
        kind.external_index().is_some_and(|index| self.contains(index))
    }

    /// Adds the token with external index `index`.
    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < EXTERNAL_TOKENS.len());
        self.0 |= 1 << index;
    }

    /// Adds `kind` if it is an external token.
    pub fn insert_kind(&mut self, kind: SyntaxKind) {
        if let Some(index) = kind.external_index() {
            self.insert(index);
        }
    }

    /// Returns the union of both sets.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the kinds in the set.
    pub fn kinds(self) -> impl Iterator<Item = SyntaxKind> {
        EXTERNAL_TOKENS
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.contains(*index))
            .map(|(_, kind)| *kind)
    }
}

impl FromIterator<SyntaxKind> for ValidSymbols {
    fn from_iter<I: IntoIterator<Item = SyntaxKind>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for kind in iter {
            set.insert_kind(kind);
        }
        set
    }
}

impl fmt::Debug for ValidSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.kinds().map(SyntaxKind::name))
            .finish()
    }
}

/// A serialized scanner state of bounded size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExternalState {
    len: u8,
    bytes: [u8; ExternalState::CAPACITY],
}

impl ExternalState {
    /// Maximum number of bytes a scanner may serialize.
    pub const CAPACITY: usize = 16;

    /// Returns the serialized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Replaces the contents with `bytes`, truncated to [`Self::CAPACITY`].
    pub fn set(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= Self::CAPACITY, "scanner state too large");
        let len = bytes.len().min(Self::CAPACITY);
        self.bytes = [0; Self::CAPACITY];
        self.bytes[..len].copy_from_slice(&bytes[..len]);
        // `len` is bounded by CAPACITY, which fits in a byte.
        self.len = u8::try_from(len).unwrap_or(u8::MAX);
    }

    /// Returns `true` if nothing was serialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for ExternalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExternalState({:?})", self.as_bytes())
    }
}

/// Read access to the source for an external scanner.
///
/// The cursor starts at the token position. `advance` moves over one
/// character; `mark_end` fixes the end of the token being recognized. Every
/// character looked at is recorded so the engine knows how far each token
/// depended on the input.
#[derive(Debug)]
pub struct Cursor<'a> {
    text: &'a str,
    start: usize,
    position: usize,
    marked_end: usize,
    max_read: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at byte offset `start` of `text`.
    #[must_use]
    pub fn new(text: &'a str, start: usize) -> Self {
        Self {
            text,
            start,
            position: start,
            marked_end: start,
            max_read: start,
        }
    }

    /// Returns the current character without consuming it.
    pub fn lookahead(&mut self) -> Option<char> {
        self.lookahead_nth(0)
    }

    /// Returns the character `n` places after the current one.
    pub fn lookahead_nth(&mut self, n: usize) -> Option<char> {
        let rest = self.text.get(self.position..)?;
        match rest.char_indices().nth(n) {
            Some((offset, c)) => {
                self.record(self.position + offset + c.len_utf8());
                Some(c)
            }
            None => {
                // Seeing the end of input is a dependency too.
                self.record(self.text.len() + 1);
                None
            }
        }
    }

    /// Moves past the current character.
    pub fn advance(&mut self) {
        if let Some(c) = self.lookahead() {
            self.position += c.len_utf8();
        }
    }

    /// Marks the current position as the end of the token.
    pub fn mark_end(&mut self) {
        self.marked_end = self.position;
    }

    /// Current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Byte offset where the token starts.
    #[must_use]
    pub fn token_start(&self) -> usize {
        self.start
    }

    /// Byte offset of the marked token end.
    #[must_use]
    pub fn token_end(&self) -> usize {
        self.marked_end
    }

    /// Returns `true` at end of input.
    #[must_use]
    pub fn at_eof(&self) -> bool {
        self.position >= self.text.len()
    }

    /// The byte just before the token start, if any.
    #[must_use]
    pub fn prev_byte(&self) -> Option<u8> {
        self.start
            .checked_sub(1)
            .and_then(|index| self.text.as_bytes().get(index).copied())
    }

    /// Returns `true` if only blanks and line continuations separate the
    /// token start from the previous real newline (or the start of input).
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        let bytes = self.text.as_bytes();
        let mut index = self.start;
        loop {
            if index == 0 {
                return true;
            }
            match bytes[index - 1] {
                b' ' | b'\t' | b'\r' | 0x0B | 0x0C => index -= 1,
                b'\n' => match continuation_before(bytes, index - 1) {
                    Some(start) => index = start,
                    None => return true,
                },
                _ => return false,
            }
        }
    }

    /// One past the furthest byte examined so far.
    #[must_use]
    pub fn max_examined(&self) -> usize {
        self.max_read
    }

    fn record(&mut self, end: usize) {
        self.max_read = self.max_read.max(end);
    }
}

/// If the newline at `newline` ends a backslash continuation, returns the
/// offset of the backslash.
fn continuation_before(bytes: &[u8], newline: usize) -> Option<usize> {
    let mut index = newline;
    if index > 0 && bytes[index - 1] == b'\r' {
        index -= 1;
    }
    (index > 0 && bytes[index - 1] == b'\\').then(|| index - 1)
}

/// Offset of the newline that ends the logical line containing `offset`,
/// or the text length on the last line.
pub(crate) fn logical_line_end(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut index = offset.min(bytes.len());
    while let Some(found) = bytes[index..].iter().position(|&byte| byte == b'\n') {
        let newline = index + found;
        if continuation_before(bytes, newline).is_none() {
            return newline;
        }
        index = newline + 1;
    }
    bytes.len()
}

/// Start of the logical line containing `offset`: the byte after the last
/// newline before it that does not end a line continuation.
pub(crate) fn logical_line_start(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut index = offset.min(bytes.len());
    while index > 0 {
        if bytes[index - 1] == b'\n' {
            match continuation_before(bytes, index - 1) {
                Some(start) => {
                    index = start;
                    continue;
                }
                None => return index,
            }
        }
        index -= 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_tracks_furthest_read() {
        let mut cursor = Cursor::new("abc", 0);
        assert_eq!(cursor.lookahead(), Some('a'));
        cursor.advance();
        assert_eq!(cursor.lookahead_nth(1), Some('c'));
        assert_eq!(cursor.max_examined(), 3);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.token_end(), 0);
        cursor.mark_end();
        assert_eq!(cursor.token_end(), 1);
    }

    #[test]
    fn test_cursor_eof_counts_as_examined() {
        let mut cursor = Cursor::new("a", 1);
        assert!(cursor.at_eof());
        assert_eq!(cursor.lookahead(), None);
        assert_eq!(cursor.max_examined(), 2);
    }

    #[test]
    fn test_at_line_start() {
        let text = "x\n  #a\n \\\n #b c #d";
        let at = |offset| Cursor::new(text, offset).at_line_start();
        assert!(at(0));
        assert!(at(4));
        assert!(at(11));
        assert!(!at(16));
    }

    #[test]
    fn test_at_line_start_with_crlf() {
        let text = "a\r\n#b\\\r\n#c";
        assert!(Cursor::new(text, 3).at_line_start());
        assert!(!Cursor::new(text, 8).at_line_start());
    }

    #[test]
    fn test_prev_byte() {
        assert_eq!(Cursor::new("F(x)", 1).prev_byte(), Some(b'F'));
        assert_eq!(Cursor::new("F(x)", 0).prev_byte(), None);
    }

    #[test]
    fn test_logical_line_start() {
        let text = "ab\ncd \\\nef\ngh";
        assert_eq!(logical_line_start(text, 1), 0);
        assert_eq!(logical_line_start(text, 3), 3);
        assert_eq!(logical_line_start(text, 9), 3);
        assert_eq!(logical_line_start(text, 12), 11);
    }

    #[test]
    fn test_logical_line_end() {
        let text = "ab\ncd \\\nef\ngh";
        assert_eq!(logical_line_end(text, 0), 2);
        assert_eq!(logical_line_end(text, 2), 2);
        assert_eq!(logical_line_end(text, 3), 10);
        assert_eq!(logical_line_end(text, 11), 13);
    }

    #[test]
    fn test_valid_symbols() {
        let set: ValidSymbols = [SyntaxKind::DirectiveEnd, SyntaxKind::PreprocArg]
            .into_iter()
            .collect();
        assert!(set.contains_kind(SyntaxKind::DirectiveEnd));
        assert!(set.contains_kind(SyntaxKind::PreprocArg));
        assert!(!set.contains_kind(SyntaxKind::TokenPaste));
        assert!(!set.contains_kind(SyntaxKind::Identifier));
        assert_eq!(
            set.kinds().collect::<Vec<_>>(),
            vec![SyntaxKind::DirectiveEnd, SyntaxKind::PreprocArg]
        );
    }

    #[test]
    fn test_external_state_bytes() {
        let mut state = ExternalState::default();
        assert!(state.is_empty());
        state.set(&[1, 2]);
        assert_eq!(state.as_bytes(), &[1, 2]);
        let copy = state;
        assert_eq!(copy, state);
    }
}
