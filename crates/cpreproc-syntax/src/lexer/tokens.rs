//! Token definitions for the static (context-free) part of the lexer.
//!
//! Everything whose meaning depends on where it appears (directive starts,
//! logical line ends, `##` and `#` in replacement lists, `<...>` include
//! paths) is left to the external scanner; see `crate::scanner`.

use logos::Logos;

fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// All token kinds produced by the static lexer.
///
/// Token kinds are divided into categories:
/// - Padding (whitespace, newlines, line continuations) - folded into the
///   leading padding of the next token
/// - Comments - kept in the tree as extras
/// - Literals and identifiers
/// - Punctuators and operators
/// - `Unknown` for bytes no rule matches
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u16)]
pub enum TokenKind {
    // =========================================================================
    // PADDING
    // =========================================================================
    /// Horizontal whitespace
    #[regex(r"[ \t\x0B\x0C\r]+")]
    Whitespace,

    /// A physical line end
    #[regex(r"\r?\n")]
    Newline,

    /// A backslash immediately followed by a line end; joins two physical lines
    #[regex(r"\\\r?\n")]
    LineContinuation,

    // =========================================================================
    // COMMENTS
    // =========================================================================
    /// `// ...` (continued by a trailing backslash) or `/* ... */`
    #[regex(r"//([^\\\n]|\\[^\r\n]|\\\r?\n)*")]
    #[token("/*", lex_block_comment)]
    Comment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Identifier
    #[regex(r"[a-zA-Z_$\u{80}-\u{10FFFF}][a-zA-Z0-9_$\u{80}-\u{10FFFF}]*")]
    Identifier,

    /// Integer or floating literal, with digit separators and suffixes
    #[regex(
        r"(0[xX][0-9a-fA-F]('?[0-9a-fA-F])*(\.([0-9a-fA-F]('?[0-9a-fA-F])*)?)?|0[bB][0-9]('?[0-9])*|[0-9]('?[0-9])*(\.([0-9]('?[0-9])*)?)?|\.[0-9]('?[0-9])*)([eEpP][-+]?[0-9]('?[0-9])*)?[uUlLwWfFbBdD]*"
    )]
    NumberLiteral,

    /// Character literal: `'a'`, `L'\n'`, `u8'x'`
    #[regex(r"(L|u|U|u8)?'([^'\\\n]|\\[^\r\n])+'")]
    CharLiteral,

    /// String literal: `"..."`, `L"..."`, `u8"..."`
    #[regex(r#"(L|u|U|u8)?"([^"\\\n]|\\[^\r\n]|\\\r?\n)*""#)]
    StringLiteral,

    /// `defined`
    #[token("defined")]
    KwDefined,

    // =========================================================================
    // PUNCTUATORS
    // =========================================================================
    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `!`
    #[token("!")]
    Bang,

    /// `~`
    #[token("~")]
    Tilde,

    /// `-`
    #[token("-")]
    Minus,

    /// `+`
    #[token("+")]
    Plus,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    /// `%`
    #[token("%")]
    Percent,

    /// `||`
    #[token("||")]
    PipePipe,

    /// `&&`
    #[token("&&")]
    AmpAmp,

    /// `|`
    #[token("|")]
    Pipe,

    /// `^`
    #[token("^")]
    Caret,

    /// `&`
    #[token("&")]
    Amp,

    /// `==`
    #[token("==")]
    EqEq,

    /// `!=`
    #[token("!=")]
    BangEq,

    /// `>`
    #[token(">")]
    Gt,

    /// `>=`
    #[token(">=")]
    GtEq,

    /// `<=`
    #[token("<=")]
    LtEq,

    /// `<`
    #[token("<")]
    Lt,

    /// `<<`
    #[token("<<")]
    LtLt,

    /// `>>`
    #[token(">>")]
    GtGt,

    /// `,`
    #[token(",")]
    Comma,

    /// `?`
    #[token("?")]
    Question,

    /// `:`
    #[token(":")]
    Colon,

    /// `=`
    #[token("=")]
    Eq,

    /// `*=`
    #[token("*=")]
    StarEq,

    /// `/=`
    #[token("/=")]
    SlashEq,

    /// `%=`
    #[token("%=")]
    PercentEq,

    /// `+=`
    #[token("+=")]
    PlusEq,

    /// `-=`
    #[token("-=")]
    MinusEq,

    /// `<<=`
    #[token("<<=")]
    LtLtEq,

    /// `>>=`
    #[token(">>=")]
    GtGtEq,

    /// `&=`
    #[token("&=")]
    AmpEq,

    /// `^=`
    #[token("^=")]
    CaretEq,

    /// `|=`
    #[token("|=")]
    PipeEq,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `...`
    #[token("...")]
    Ellipsis,

    /// `.`
    #[token(".")]
    Dot,

    /// `->`
    #[token("->")]
    Arrow,

    /// `::`
    #[token("::")]
    ColonColon,

    /// `++`
    #[token("++")]
    PlusPlus,

    /// `--`
    #[token("--")]
    MinusMinus,

    /// `#` outside of any context where it is an operator
    #[token("#")]
    Hash,

    /// `##` outside of a replacement list
    #[token("##")]
    HashHash,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    /// Bytes no rule matches (stray backslash, unterminated comment or literal)
    #[default]
    Unknown,
}

impl TokenKind {
    /// Returns `true` for kinds folded into the padding of the next token.
    #[must_use]
    pub fn is_padding(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::LineContinuation
        )
    }

    /// Returns `true` for kinds that carry no syntax: padding and comments.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        self.is_padding() || self == Self::Comment
    }
}
