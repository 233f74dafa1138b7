//! Syntax kinds and the `rowan` view of C preprocessor trees.
//!
//! `SyntaxKind` is the grammar's symbol table: static lexer tokens first,
//! then end of input, then external scanner tokens, then visible nodes and
//! finally hidden nodes that are flattened into their parents. A kind's
//! discriminant is its stable symbol id.

use crate::lexer::TokenKind;
use crate::token_kinds::for_each_token_kind;

macro_rules! define_syntax_kinds {
    (
        tokens: [$($token:ident),* $(,)?],
        rest: [$($rest:ident),* $(,)?] $(,)?
    ) => {
        /// All token and node kinds of the C preprocessor grammar.
        // Variants mirror grammar symbol names; documenting each would be noisy.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($token,)*
            $($rest,)*
        }

        impl SyntaxKind {
            /// Every kind, indexed by symbol id.
            pub const ALL: &'static [SyntaxKind] = &[
                $(SyntaxKind::$token,)*
                $(SyntaxKind::$rest,)*
            ];
        }

        impl From<TokenKind> for SyntaxKind {
            fn from(kind: TokenKind) -> Self {
                match kind {
                    $(TokenKind::$token => SyntaxKind::$token,)*
                }
            }
        }
    };
}

macro_rules! with_token_kinds {
    ($($token:ident),* $(,)?) => {
        define_syntax_kinds! {
            tokens: [$($token),*],
            rest: [
                // =============================================================
                // END OF INPUT
                // =============================================================
                Eof,

                // =============================================================
                // EXTERNAL SCANNER TOKENS (order matches `EXTERNAL_TOKENS`)
                // =============================================================
                DirectiveEnd,
                DirInclude,
                DirIncludeNext,
                DirDefine,
                DirUndef,
                DirIf,
                DirIfdef,
                DirIfndef,
                DirElif,
                DirElifdef,
                DirElifndef,
                DirElse,
                DirEndif,
                DirLine,
                DirError,
                DirEval,
                DirEndeval,
                PreprocDirective,
                PreprocArg,
                SystemLibString,
                ParamsOpen,
                TokenPaste,
                Stringify,

                // =============================================================
                // NODES
                // =============================================================
                Error,
                TranslationUnit,
                PreprocInclude,
                PreprocIncludeNext,
                PreprocDef,
                PreprocFunctionDef,
                PreprocParams,
                VariadicParameter,
                PreprocUndef,
                PreprocError,
                PreprocLine,
                PreprocEval,
                PreprocCall,
                PreprocIf,
                PreprocIfdef,
                PreprocIfndef,
                PreprocElse,
                PreprocElif,
                PreprocElifdef,
                PreprocElifndef,
                BlockItems,
                PreprocTokens,
                CTokens,
                CallExpression,
                ArgumentList,
                PreprocDefined,
                UnaryExpression,
                BinaryExpression,
                ParenthesizedExpression,
                ConditionalExpression,

                // =============================================================
                // HIDDEN NODES (flattened into their parent)
                // =============================================================
                ItemList,
                BlockItem,
                CTokenSeq,
                CToken,
                PpToken,
                ReplacementSeq,
                ReplacementToken,
                Expression,
                ArgSeq,
                ParamSeq,
                Param,
                IfAlternative,
                EndifLine,
                LineFlags,
                IncludePath,
            ],
        }
    };
}

for_each_token_kind!(with_token_kinds);

/// External scanner tokens, in the order the scanner reports them.
pub const EXTERNAL_TOKENS: &[SyntaxKind] = &[
    SyntaxKind::DirectiveEnd,
    SyntaxKind::DirInclude,
    SyntaxKind::DirIncludeNext,
    SyntaxKind::DirDefine,
    SyntaxKind::DirUndef,
    SyntaxKind::DirIf,
    SyntaxKind::DirIfdef,
    SyntaxKind::DirIfndef,
    SyntaxKind::DirElif,
    SyntaxKind::DirElifdef,
    SyntaxKind::DirElifndef,
    SyntaxKind::DirElse,
    SyntaxKind::DirEndif,
    SyntaxKind::DirLine,
    SyntaxKind::DirError,
    SyntaxKind::DirEval,
    SyntaxKind::DirEndeval,
    SyntaxKind::PreprocDirective,
    SyntaxKind::PreprocArg,
    SyntaxKind::SystemLibString,
    SyntaxKind::ParamsOpen,
    SyntaxKind::TokenPaste,
    SyntaxKind::Stringify,
];

impl SyntaxKind {
    /// Number of kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Number of terminal kinds (tokens, end of input and external tokens).
    pub const TERMINAL_COUNT: usize = Self::Stringify as usize + 1;

    /// Returns the kind with the given symbol id.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// Returns the symbol id.
    #[must_use]
    pub fn to_raw(self) -> u16 {
        self as u16
    }

    /// Returns `true` if this is a terminal (a token kind).
    #[must_use]
    pub fn is_token(self) -> bool {
        (self as usize) < Self::TERMINAL_COUNT
    }

    /// Returns `true` if this is a composite node kind.
    #[must_use]
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns `true` if this kind is produced by the external scanner.
    #[must_use]
    pub fn is_external(self) -> bool {
        self.external_index().is_some()
    }

    /// Index of this kind in [`EXTERNAL_TOKENS`].
    #[must_use]
    pub fn external_index(self) -> Option<usize> {
        let first = Self::DirectiveEnd as usize;
        let index = (self as usize).checked_sub(first)?;
        (index < EXTERNAL_TOKENS.len()).then_some(index)
    }

    /// Returns `true` for kinds folded into token padding.
    #[must_use]
    pub fn is_padding(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::LineContinuation
        )
    }

    /// Returns `true` if this is a trivia kind.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        self.is_padding() || self == Self::Comment
    }

    /// Returns `true` for tokens that may appear anywhere (comments).
    #[must_use]
    pub fn is_extra(self) -> bool {
        self == Self::Comment
    }

    /// Returns `true` for kinds the tree never shows: hidden nodes and padding.
    #[must_use]
    pub fn is_hidden(self) -> bool {
        self.is_padding() || (self as usize) >= Self::ItemList as usize
    }

    /// Returns `true` for tokens where recovery resynchronizes: logical line
    /// ends, directive starts and end of input.
    #[must_use]
    pub fn is_sync(self) -> bool {
        matches!(self, Self::Eof | Self::DirectiveEnd)
            || ((self as usize) >= Self::DirInclude as usize
                && (self as usize) <= Self::PreprocDirective as usize)
    }

    /// Returns `true` for kinds with a name of their own (not punctuation).
    #[must_use]
    pub fn is_named(self) -> bool {
        match self {
            Self::Comment
            | Self::Identifier
            | Self::NumberLiteral
            | Self::CharLiteral
            | Self::StringLiteral
            | Self::PreprocDirective
            | Self::PreprocArg
            | Self::SystemLibString => true,
            _ => self.is_node() && !self.is_hidden(),
        }
    }

    /// Returns the grammar name of this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Whitespace => "_whitespace",
            Self::Newline => "_newline",
            Self::LineContinuation => "_line_continuation",
            Self::Comment => "comment",
            Self::Identifier => "identifier",
            Self::NumberLiteral => "number_literal",
            Self::CharLiteral => "char_literal",
            Self::StringLiteral => "string_literal",
            Self::KwDefined => "defined",
            Self::LParen | Self::ParamsOpen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Bang => "!",
            Self::Tilde => "~",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::PipePipe => "||",
            Self::AmpAmp => "&&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Amp => "&",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
            Self::Lt => "<",
            Self::LtLt => "<<",
            Self::GtGt => ">>",
            Self::Comma => ",",
            Self::Question => "?",
            Self::Colon => ":",
            Self::Eq => "=",
            Self::StarEq => "*=",
            Self::SlashEq => "/=",
            Self::PercentEq => "%=",
            Self::PlusEq => "+=",
            Self::MinusEq => "-=",
            Self::LtLtEq => "<<=",
            Self::GtGtEq => ">>=",
            Self::AmpEq => "&=",
            Self::CaretEq => "^=",
            Self::PipeEq => "|=",
            Self::Semicolon => ";",
            Self::Ellipsis => "...",
            Self::Dot => ".",
            Self::Arrow => "->",
            Self::ColonColon => "::",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::Hash | Self::Stringify => "#",
            Self::HashHash | Self::TokenPaste => "##",
            Self::Unknown => "unknown_token",
            Self::Eof => "end",
            Self::DirectiveEnd => "\n",
            Self::DirInclude => "#include",
            Self::DirIncludeNext => "#include_next",
            Self::DirDefine => "#define",
            Self::DirUndef => "#undef",
            Self::DirIf => "#if",
            Self::DirIfdef => "#ifdef",
            Self::DirIfndef => "#ifndef",
            Self::DirElif => "#elif",
            Self::DirElifdef => "#elifdef",
            Self::DirElifndef => "#elifndef",
            Self::DirElse => "#else",
            Self::DirEndif => "#endif",
            Self::DirLine => "#line",
            Self::DirError => "#error",
            Self::DirEval => "#eval",
            Self::DirEndeval => "#endeval",
            Self::PreprocDirective => "preproc_directive",
            Self::PreprocArg => "preproc_arg",
            Self::SystemLibString => "system_lib_string",
            Self::Error => "ERROR",
            Self::TranslationUnit => "translation_unit",
            Self::PreprocInclude => "preproc_include",
            Self::PreprocIncludeNext => "preproc_include_next",
            Self::PreprocDef => "preproc_def",
            Self::PreprocFunctionDef => "preproc_function_def",
            Self::PreprocParams => "preproc_params",
            Self::VariadicParameter => "variadic_parameter",
            Self::PreprocUndef => "preproc_undef",
            Self::PreprocError => "preproc_error",
            Self::PreprocLine => "preproc_line",
            Self::PreprocEval => "preproc_eval",
            Self::PreprocCall => "preproc_call",
            Self::PreprocIf => "preproc_if",
            Self::PreprocIfdef => "preproc_ifdef",
            Self::PreprocIfndef => "preproc_ifndef",
            Self::PreprocElse => "preproc_else",
            Self::PreprocElif => "preproc_elif",
            Self::PreprocElifdef => "preproc_elifdef",
            Self::PreprocElifndef => "preproc_elifndef",
            Self::BlockItems => "block_items",
            Self::PreprocTokens => "preproc_tokens",
            Self::CTokens => "c_tokens",
            Self::CallExpression => "call_expression",
            Self::ArgumentList => "argument_list",
            Self::PreprocDefined => "preproc_defined",
            Self::UnaryExpression => "unary_expression",
            Self::BinaryExpression => "binary_expression",
            Self::ParenthesizedExpression => "parenthesized_expression",
            Self::ConditionalExpression => "conditional_expression",
            Self::ItemList => "_items",
            Self::BlockItem => "_block_item",
            Self::CTokenSeq => "_c_token_seq",
            Self::CToken => "_c_token",
            Self::PpToken => "_preproc_token",
            Self::ReplacementSeq => "_replacement_seq",
            Self::ReplacementToken => "_replacement_token",
            Self::Expression => "_preproc_expression",
            Self::ArgSeq => "_argument_seq",
            Self::ParamSeq => "_parameter_seq",
            Self::Param => "_parameter",
            Self::IfAlternative => "_if_alternative",
            Self::EndifLine => "_endif",
            Self::LineFlags => "_line_flags",
            Self::IncludePath => "_include_path",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// The `rowan` language type for C preprocessor trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreprocLanguage {}

impl rowan::Language for PreprocLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0).unwrap_or(SyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// A syntax node in the lossless view.
pub type SyntaxNode = rowan::SyntaxNode<PreprocLanguage>;

/// A syntax token in the lossless view.
pub type SyntaxToken = rowan::SyntaxToken<PreprocLanguage>;

/// A syntax element (either node or token) in the lossless view.
pub type SyntaxElement = rowan::SyntaxElement<PreprocLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_to_syntax_kind() {
        assert_eq!(SyntaxKind::from(TokenKind::KwDefined), SyntaxKind::KwDefined);
        assert_eq!(SyntaxKind::from(TokenKind::Identifier), SyntaxKind::Identifier);
        assert_eq!(SyntaxKind::from(TokenKind::Unknown), SyntaxKind::Unknown);
    }

    #[test]
    fn test_raw_round_trip_covers_all_kinds() {
        for (index, kind) in SyntaxKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind.to_raw()), index);
            assert_eq!(SyntaxKind::from_raw(kind.to_raw()), Some(*kind));
        }
        assert_eq!(SyntaxKind::from_raw(SyntaxKind::COUNT as u16), None);
    }

    #[test]
    fn test_is_token_vs_node() {
        assert!(SyntaxKind::Identifier.is_token());
        assert!(SyntaxKind::Eof.is_token());
        assert!(SyntaxKind::Stringify.is_token());
        assert!(!SyntaxKind::Error.is_token());
        assert!(SyntaxKind::PreprocDef.is_node());
    }

    #[test]
    fn test_external_indices_match_table() {
        for (index, kind) in EXTERNAL_TOKENS.iter().enumerate() {
            assert_eq!(kind.external_index(), Some(index));
        }
        assert_eq!(SyntaxKind::Identifier.external_index(), None);
        assert_eq!(SyntaxKind::Error.external_index(), None);
    }

    #[test]
    fn test_visibility() {
        assert!(SyntaxKind::ItemList.is_hidden());
        assert!(SyntaxKind::Whitespace.is_hidden());
        assert!(!SyntaxKind::CTokens.is_hidden());
        assert!(SyntaxKind::CTokens.is_named());
        assert!(SyntaxKind::Identifier.is_named());
        assert!(!SyntaxKind::DirDefine.is_named());
        assert!(!SyntaxKind::ItemList.is_named());
    }

    #[test]
    fn test_sync_tokens() {
        assert!(SyntaxKind::Eof.is_sync());
        assert!(SyntaxKind::DirectiveEnd.is_sync());
        assert!(SyntaxKind::DirEndif.is_sync());
        assert!(SyntaxKind::PreprocDirective.is_sync());
        assert!(!SyntaxKind::PreprocArg.is_sync());
        assert!(!SyntaxKind::Identifier.is_sync());
    }
}
