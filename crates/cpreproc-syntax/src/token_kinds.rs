//! The list of static lexer token kinds, shared by `TokenKind` and `SyntaxKind`.

/// Invokes `$m!` with every static lexer token kind, in declaration order.
macro_rules! for_each_token_kind {
    ($m:ident) => {
        $m! {
            Whitespace,
            Newline,
            LineContinuation,
            Comment,
            Identifier,
            NumberLiteral,
            CharLiteral,
            StringLiteral,
            KwDefined,
            LParen,
            RParen,
            LBrace,
            RBrace,
            LBracket,
            RBracket,
            Bang,
            Tilde,
            Minus,
            Plus,
            Star,
            Slash,
            Percent,
            PipePipe,
            AmpAmp,
            Pipe,
            Caret,
            Amp,
            EqEq,
            BangEq,
            Gt,
            GtEq,
            LtEq,
            Lt,
            LtLt,
            GtGt,
            Comma,
            Question,
            Colon,
            Eq,
            StarEq,
            SlashEq,
            PercentEq,
            PlusEq,
            MinusEq,
            LtLtEq,
            GtGtEq,
            AmpEq,
            CaretEq,
            PipeEq,
            Semicolon,
            Ellipsis,
            Dot,
            Arrow,
            ColonColon,
            PlusPlus,
            MinusMinus,
            Hash,
            HashHash,
            Unknown,
        }
    };
}

pub(crate) use for_each_token_kind;
