//! Static lexer for C preprocessor source.
//!
//! This module tokenizes everything that does not depend on parse context.
//! The parser consults the external scanner first at every token position
//! and only falls back to [`lex_one`] when the scanner has no match.

mod tokens;

pub use tokens::TokenKind;

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range of the token in the source text.
    pub range: TextRange,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, range: TextRange) -> Self {
        Self { kind, range }
    }
}

/// Context-free lexer over a whole source text.
///
/// The lexer is an iterator over tokens. Unrecognized bytes are returned as
/// `TokenKind::Unknown`. It does not know about directives; `#include` comes
/// out as `Hash` followed by `Identifier`.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.inner.next()?.unwrap_or(TokenKind::Unknown);
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        Some(Token::new(kind, range))
    }
}

/// Lexes a single token at the start of `text`.
///
/// Returns the token kind and its length in bytes, or `None` when `text` is
/// empty. The length is never zero for non-empty input.
#[must_use]
pub fn lex_one(text: &str) -> Option<(TokenKind, usize)> {
    let mut inner = TokenKind::lexer(text);
    let kind = inner.next()?.unwrap_or(TokenKind::Unknown);
    let len = inner.span().end.max(1);
    // A failed match may stop inside a multi-byte character.
    let len = (len..=text.len())
        .find(|&end| text.is_char_boundary(end))
        .unwrap_or(text.len());
    Some((kind, len))
}

/// Lex the entire source and return all tokens.
///
/// This is a convenience function for testing and simple use cases.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_basic() {
        let source = "int x = FOO(1);";
        let tokens = lex(source);

        let non_trivia: Vec<_> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
        assert_eq!(non_trivia.len(), 8);
        assert_eq!(non_trivia[0].kind, TokenKind::Identifier);
        assert_eq!(non_trivia[2].kind, TokenKind::Eq);
        assert_eq!(non_trivia[4].kind, TokenKind::LParen);
        assert_eq!(non_trivia[5].kind, TokenKind::NumberLiteral);
        assert_eq!(non_trivia[7].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_lexer_preserves_positions() {
        let source = "abc += 123";
        let tokens = lex(source);

        assert_eq!(tokens[0].range, TextRange::new(0.into(), 3.into()));
        assert_eq!(tokens[1].range, TextRange::new(3.into(), 4.into()));
        assert_eq!(tokens[2].range, TextRange::new(4.into(), 6.into()));
    }

    #[test]
    fn test_hash_is_not_a_directive() {
        let kinds: Vec<_> = lex("# define X")
            .into_iter()
            .filter(|token| !token.kind.is_trivia())
            .map(|token| token.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Hash, TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_lex_one() {
        assert_eq!(lex_one("foo bar"), Some((TokenKind::Identifier, 3)));
        assert_eq!(lex_one("  x"), Some((TokenKind::Whitespace, 2)));
        assert_eq!(lex_one("\\x"), Some((TokenKind::Unknown, 1)));
        assert_eq!(lex_one(""), None);
    }
}
