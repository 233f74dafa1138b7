//! The C preprocessor grammar.

use super::{field, opt, sym, Grammar, GrammarBuilder};
use crate::syntax::SyntaxKind as K;

const PREC_COMMA: i32 = -3;
const PREC_CONDITIONAL: i32 = -1;
const PREC_LOGICAL_OR: i32 = 1;
const PREC_LOGICAL_AND: i32 = 2;
const PREC_INCLUSIVE_OR: i32 = 3;
const PREC_EXCLUSIVE_OR: i32 = 4;
const PREC_BITWISE_AND: i32 = 5;
const PREC_EQUAL: i32 = 6;
const PREC_RELATIONAL: i32 = 7;
const PREC_SHIFT: i32 = 9;
const PREC_ADD: i32 = 10;
const PREC_MULTIPLY: i32 = 11;
const PREC_UNARY: i32 = 14;
const PREC_CALL: i32 = 15;

const BLOCK_ITEMS: &[K] = &[
    K::PreprocIf,
    K::PreprocIfdef,
    K::PreprocIfndef,
    K::PreprocInclude,
    K::PreprocIncludeNext,
    K::PreprocDef,
    K::PreprocFunctionDef,
    K::PreprocUndef,
    K::PreprocError,
    K::PreprocLine,
    K::PreprocEval,
    K::PreprocCall,
    K::CTokens,
];

/// Tokens allowed in replacement lists and ordinary text.
const PREPROC_TOKENS: &[K] = &[
    K::Identifier,
    K::NumberLiteral,
    K::CharLiteral,
    K::StringLiteral,
    K::KwDefined,
    K::Bang,
    K::Tilde,
    K::Minus,
    K::Plus,
    K::LParen,
    K::RParen,
    K::LBrace,
    K::RBrace,
    K::LBracket,
    K::RBracket,
    K::Star,
    K::Slash,
    K::Percent,
    K::PipePipe,
    K::AmpAmp,
    K::Pipe,
    K::Caret,
    K::Amp,
    K::EqEq,
    K::BangEq,
    K::Gt,
    K::GtEq,
    K::LtEq,
    K::Lt,
    K::LtLt,
    K::GtGt,
    K::Comma,
    K::Question,
    K::Colon,
    K::Eq,
    K::StarEq,
    K::SlashEq,
    K::PercentEq,
    K::PlusEq,
    K::MinusEq,
    K::LtLtEq,
    K::GtGtEq,
    K::AmpEq,
    K::CaretEq,
    K::PipeEq,
    K::Semicolon,
    K::Ellipsis,
    K::Dot,
    K::Arrow,
    K::ColonColon,
    K::PlusPlus,
    K::MinusMinus,
];

const BINARY_OPERATORS: &[(K, i32)] = &[
    (K::Plus, PREC_ADD),
    (K::Minus, PREC_ADD),
    (K::Star, PREC_MULTIPLY),
    (K::Slash, PREC_MULTIPLY),
    (K::Percent, PREC_MULTIPLY),
    (K::PipePipe, PREC_LOGICAL_OR),
    (K::AmpAmp, PREC_LOGICAL_AND),
    (K::Pipe, PREC_INCLUSIVE_OR),
    (K::Caret, PREC_EXCLUSIVE_OR),
    (K::Amp, PREC_BITWISE_AND),
    (K::EqEq, PREC_EQUAL),
    (K::BangEq, PREC_EQUAL),
    (K::Gt, PREC_RELATIONAL),
    (K::GtEq, PREC_RELATIONAL),
    (K::LtEq, PREC_RELATIONAL),
    (K::Lt, PREC_RELATIONAL),
    (K::LtLt, PREC_SHIFT),
    (K::GtGt, PREC_SHIFT),
    (K::Comma, PREC_COMMA),
];

const UNARY_OPERATORS: &[K] = &[K::Bang, K::Tilde, K::Minus, K::Plus];

/// Builds the grammar.
#[must_use]
pub fn grammar() -> Grammar {
    let mut g = GrammarBuilder::new(K::TranslationUnit);

    g.rule(K::TranslationUnit, std::iter::empty());
    g.rule(K::TranslationUnit, [sym(K::ItemList)]);
    g.rule(K::ItemList, [sym(K::BlockItem)]);
    g.rule(K::ItemList, [sym(K::ItemList), sym(K::BlockItem)]);
    for item in BLOCK_ITEMS {
        g.rule(K::BlockItem, [sym(*item)]);
    }
    g.rule(K::BlockItems, [sym(K::ItemList)]);

    text(&mut g);
    includes(&mut g);
    macros(&mut g);
    simple_directives(&mut g);
    conditionals(&mut g);
    expressions(&mut g);

    g.build()
}

fn text(g: &mut GrammarBuilder) {
    // A run of text only ends where something else begins.
    g.rule(K::CTokens, [sym(K::CTokenSeq)]).right(0);
    g.rule(K::CTokenSeq, [field("token", K::CToken)]);
    g.rule(K::CTokenSeq, [sym(K::CTokenSeq), field("token", K::CToken)]);
    g.rule(K::CToken, [sym(K::PpToken)]);
    g.rule(K::CToken, [sym(K::Hash)]);
    g.rule(K::CToken, [sym(K::HashHash)]);
    for token in PREPROC_TOKENS {
        g.rule(K::PpToken, [sym(*token)]);
    }
}

fn includes(g: &mut GrammarBuilder) {
    for (node, directive) in [
        (K::PreprocInclude, K::DirInclude),
        (K::PreprocIncludeNext, K::DirIncludeNext),
    ] {
        g.rule(
            node,
            [sym(directive), field("path", K::IncludePath), sym(K::DirectiveEnd)],
        );
    }
    for path in [
        K::StringLiteral,
        K::SystemLibString,
        K::Identifier,
        K::CallExpression,
    ] {
        g.rule(K::IncludePath, [sym(path)]);
    }
}

fn macros(g: &mut GrammarBuilder) {
    g.rule(
        K::PreprocDef,
        [
            sym(K::DirDefine),
            field("name", K::Identifier),
            opt(field("value", K::PreprocTokens)),
            sym(K::DirectiveEnd),
        ],
    );
    g.rule(
        K::PreprocFunctionDef,
        [
            sym(K::DirDefine),
            field("name", K::Identifier),
            field("parameters", K::PreprocParams),
            opt(field("value", K::PreprocTokens)),
            sym(K::DirectiveEnd),
        ],
    );
    g.rule(
        K::PreprocParams,
        [sym(K::ParamsOpen), opt(sym(K::ParamSeq)), sym(K::RParen)],
    );
    g.rule(K::ParamSeq, [field("parameter", K::Param)]);
    g.rule(
        K::ParamSeq,
        [sym(K::ParamSeq), sym(K::Comma), field("parameter", K::Param)],
    );
    g.rule(K::Param, [sym(K::Identifier)]);
    g.rule(K::Param, [sym(K::VariadicParameter)]);
    g.rule(K::VariadicParameter, [sym(K::Ellipsis)]);

    g.rule(K::PreprocTokens, [sym(K::ReplacementSeq)]).left(0);
    g.rule(K::ReplacementSeq, [field("token", K::ReplacementToken)]);
    g.rule(
        K::ReplacementSeq,
        [sym(K::ReplacementSeq), field("token", K::ReplacementToken)],
    );
    g.rule(K::ReplacementToken, [sym(K::PpToken)]);
    g.rule(K::ReplacementToken, [sym(K::TokenPaste)]);
    g.rule(K::ReplacementToken, [sym(K::Stringify)]);
}

fn simple_directives(g: &mut GrammarBuilder) {
    g.rule(
        K::PreprocUndef,
        [sym(K::DirUndef), field("name", K::Identifier), sym(K::DirectiveEnd)],
    );
    g.rule(
        K::PreprocError,
        [
            sym(K::DirError),
            opt(field("message", K::PreprocArg)),
            sym(K::DirectiveEnd),
        ],
    );
    g.rule(
        K::PreprocLine,
        [
            sym(K::DirLine),
            field("line_number", K::NumberLiteral),
            opt(field("filename", K::StringLiteral)),
            opt(sym(K::LineFlags)),
            sym(K::DirectiveEnd),
        ],
    );
    g.rule(K::LineFlags, [sym(K::NumberLiteral)]);
    g.rule(K::LineFlags, [sym(K::LineFlags), sym(K::NumberLiteral)]);
    g.rule(
        K::PreprocEval,
        [
            sym(K::DirEval),
            field("expr", K::Expression),
            sym(K::DirectiveEnd),
            sym(K::DirEndeval),
            sym(K::DirectiveEnd),
        ],
    );
    g.rule(
        K::PreprocCall,
        [
            field("directive", K::PreprocDirective),
            opt(field("argument", K::PreprocArg)),
            sym(K::DirectiveEnd),
        ],
    );
}

fn conditionals(g: &mut GrammarBuilder) {
    for (node, directive) in [(K::PreprocIf, K::DirIf), (K::PreprocElif, K::DirElif)] {
        for tail in [field("alternative", K::IfAlternative), sym(K::EndifLine)] {
            g.rule(
                node,
                [
                    sym(directive),
                    field("condition", K::Expression),
                    sym(K::DirectiveEnd),
                    opt(field("body", K::BlockItems)),
                    tail,
                ],
            );
        }
    }
    for (node, directive) in [
        (K::PreprocIfdef, K::DirIfdef),
        (K::PreprocIfndef, K::DirIfndef),
        (K::PreprocElifdef, K::DirElifdef),
        (K::PreprocElifndef, K::DirElifndef),
    ] {
        for tail in [field("alternative", K::IfAlternative), sym(K::EndifLine)] {
            g.rule(
                node,
                [
                    sym(directive),
                    field("name", K::Identifier),
                    sym(K::DirectiveEnd),
                    opt(field("body", K::BlockItems)),
                    tail,
                ],
            );
        }
    }
    g.rule(
        K::PreprocElse,
        [
            sym(K::DirElse),
            sym(K::DirectiveEnd),
            opt(field("body", K::BlockItems)),
            sym(K::EndifLine),
        ],
    );
    for alternative in [
        K::PreprocElse,
        K::PreprocElif,
        K::PreprocElifdef,
        K::PreprocElifndef,
    ] {
        g.rule(K::IfAlternative, [sym(alternative)]);
    }
    g.rule(K::EndifLine, [sym(K::DirEndif), sym(K::DirectiveEnd)]);
}

fn expressions(g: &mut GrammarBuilder) {
    for kind in [
        K::Identifier,
        K::NumberLiteral,
        K::CharLiteral,
        K::StringLiteral,
        K::CallExpression,
        K::PreprocDefined,
        K::UnaryExpression,
        K::BinaryExpression,
        K::ParenthesizedExpression,
        K::ConditionalExpression,
    ] {
        g.rule(K::Expression, [sym(kind)]);
    }

    g.rule(
        K::CallExpression,
        [field("function", K::Identifier), field("arguments", K::ArgumentList)],
    )
    .prec(PREC_CALL);
    g.rule(
        K::ArgumentList,
        [sym(K::LParen), opt(sym(K::ArgSeq)), sym(K::RParen)],
    )
    .prec(PREC_CALL);
    g.rule(K::ArgSeq, [field("argument", K::Expression)])
        .prec(PREC_CALL);
    g.rule(
        K::ArgSeq,
        [sym(K::ArgSeq), sym(K::Comma), field("argument", K::Expression)],
    )
    .prec(PREC_CALL);
    // `__has_include(<stdio.h>)`
    g.rule(K::ArgSeq, [field("argument", K::SystemLibString)])
        .prec(PREC_CALL);
    g.rule(
        K::ArgSeq,
        [sym(K::ArgSeq), sym(K::Comma), field("argument", K::SystemLibString)],
    )
    .prec(PREC_CALL);

    g.rule(
        K::PreprocDefined,
        [
            sym(K::KwDefined),
            sym(K::LParen),
            field("name", K::Identifier),
            sym(K::RParen),
        ],
    )
    .prec(PREC_CALL);
    g.rule(
        K::PreprocDefined,
        [sym(K::KwDefined), field("name", K::Identifier)],
    );

    for operator in UNARY_OPERATORS {
        g.rule(
            K::UnaryExpression,
            [field("operator", *operator), field("argument", K::Expression)],
        )
        .left(PREC_UNARY);
    }
    for (operator, prec) in BINARY_OPERATORS {
        g.rule(
            K::BinaryExpression,
            [
                field("left", K::Expression),
                field("operator", *operator),
                field("right", K::Expression),
            ],
        )
        .left(*prec);
    }
    g.rule(
        K::ParenthesizedExpression,
        [sym(K::LParen), field("expr", K::Expression), sym(K::RParen)],
    );
    g.rule(
        K::ConditionalExpression,
        [
            field("condition", K::Expression),
            sym(K::Question),
            opt(field("consequence", K::Expression)),
            sym(K::Colon),
            field("alternative", K::Expression),
        ],
    )
    .right(PREC_CONDITIONAL);
}
